use std::path::Path;

use super::*;

fn make_supplier(name: &str) -> Supplier {
    Supplier {
        name: name.to_string(),
        endpoint: "https://prices.example.com/list".to_string(),
        module_id: Some(1),
        format: ResponseFormat::Json,
        mapping: Some(FieldMapping::canonical()),
        status_vocabulary: StatusVocabulary::default(),
        is_active: true,
        table_selector: None,
    }
}

// -----------------------------------------------------------------------
// slug
// -----------------------------------------------------------------------

#[test]
fn slug_replaces_spaces_with_underscores() {
    assert_eq!(make_supplier("Supplier JSON Demo").slug(), "supplier_json_demo");
}

#[test]
fn slug_strips_special_characters() {
    assert_eq!(make_supplier("Bahara (H2H) Pulsa!").slug(), "bahara_h2h_pulsa");
}

#[test]
fn slug_collapses_repeated_separators() {
    assert_eq!(make_supplier("  Oke   Connect_ ").slug(), "oke_connect");
}

// -----------------------------------------------------------------------
// StatusVocabulary
// -----------------------------------------------------------------------

#[test]
fn vocabulary_lowercases_raw_token_before_lookup() {
    let vocab: StatusVocabulary = [("gangguan", "0"), ("open", "1")].into_iter().collect();
    assert_eq!(vocab.normalize("Open"), "1");
    assert_eq!(vocab.normalize("GANGGUAN"), "0");
}

#[test]
fn vocabulary_unknown_token_is_inactive() {
    let vocab: StatusVocabulary = [("1", "1")].into_iter().collect();
    assert_eq!(vocab.normalize("tersedia"), "0");
}

#[test]
fn empty_vocabulary_is_always_inactive() {
    let vocab = StatusVocabulary::default();
    assert!(vocab.is_empty());
    assert_eq!(vocab.normalize("1"), "0");
    assert_eq!(vocab.normalize(""), "0");
}

#[test]
fn vocabulary_keys_are_matched_verbatim() {
    // Raw tokens are lower-cased but keys are not, so a mixed-case key
    // can never match.
    let vocab: StatusVocabulary = [("Open", "1")].into_iter().collect();
    assert_eq!(vocab.normalize("Open"), "0");
}

// -----------------------------------------------------------------------
// FieldMapping
// -----------------------------------------------------------------------

#[test]
fn mapping_accepts_legacy_aliases() {
    let yaml = "kode: kode\ndeskripsi: keterangan\nharga: price\nstatus: status\n";
    let mapping: FieldMapping = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(mapping.source_for(CanonicalField::Code), Some("kode"));
    assert_eq!(
        mapping.source_for(CanonicalField::Description),
        Some("keterangan")
    );
    assert_eq!(mapping.source_for(CanonicalField::Price), Some("price"));
    assert_eq!(mapping.source_for(CanonicalField::Status), Some("status"));
}

#[test]
fn mapping_rejects_unknown_keys() {
    let yaml = "code: kode\nstock: qty\n";
    let err = serde_yaml::from_str::<FieldMapping>(yaml).unwrap_err();
    assert!(err.to_string().contains("stock"), "got: {err}");
}

#[test]
fn canonical_mapping_reads_same_named_keys() {
    let mapping = FieldMapping::canonical();
    for field in CanonicalField::ALL {
        assert_eq!(mapping.source_for(field), Some(field.as_str()));
    }
}

// -----------------------------------------------------------------------
// ResponseFormat
// -----------------------------------------------------------------------

#[test]
fn response_format_is_case_insensitive() {
    assert_eq!(ResponseFormat::from("JSON".to_string()), ResponseFormat::Json);
    assert_eq!(ResponseFormat::from(" html ".to_string()), ResponseFormat::Html);
}

#[test]
fn response_format_keeps_unknown_tag() {
    assert_eq!(
        ResponseFormat::from("xml".to_string()),
        ResponseFormat::Unsupported("xml".to_string())
    );
    assert_eq!(ResponseFormat::Unsupported("xml".into()).to_string(), "xml");
}

// -----------------------------------------------------------------------
// parse_suppliers / validation
// -----------------------------------------------------------------------

#[test]
fn parse_suppliers_reads_full_definition() {
    let yaml = r#"
suppliers:
  - name: Supplier JSON Demo
    url_harga: https://okeconnect.example.com/harga/json
    id_oto_modul: 1
    web_response_type: json
    mapping:
      kode: kode
      deskripsi: keterangan
      harga: price
      status: status
    status_mapping:
      "1": "1"
      "0": "0"
  - name: Supplier HTML Demo
    endpoint: https://bahara.example.com/harga.js.php
    format: HTML
    table_selector: "table.harga tr"
    status_vocabulary:
      open: "1"
      gangguan: "0"
    is_active: false
"#;
    let file = parse_suppliers(yaml).expect("valid suppliers file");
    assert_eq!(file.suppliers.len(), 2);

    let json = &file.suppliers[0];
    assert_eq!(json.format, ResponseFormat::Json);
    assert_eq!(json.module_id, Some(1));
    assert!(json.is_active);
    assert_eq!(
        json.mapping.as_ref().and_then(|m| m.description.as_deref()),
        Some("keterangan")
    );

    let html = &file.suppliers[1];
    assert_eq!(html.format, ResponseFormat::Html);
    assert!(html.mapping.is_none());
    assert!(!html.is_active);
    assert_eq!(html.table_selector.as_deref(), Some("table.harga tr"));
    assert_eq!(html.status_vocabulary.normalize("Open"), "1");

    let active: Vec<&str> = file.active().map(|s| s.name.as_str()).collect();
    assert_eq!(active, vec!["Supplier JSON Demo"]);
}

#[test]
fn parse_suppliers_keeps_unsupported_format_for_dispatch() {
    let yaml = r"
suppliers:
  - name: Legacy XML
    endpoint: https://legacy.example.com/prices.xml
    format: xml
";
    let file = parse_suppliers(yaml).expect("unknown format is not a load error");
    assert_eq!(
        file.suppliers[0].format,
        ResponseFormat::Unsupported("xml".to_string())
    );
}

#[test]
fn parse_suppliers_rejects_unknown_mapping_key() {
    let yaml = r"
suppliers:
  - name: Bad Mapping
    endpoint: https://bad.example.com
    format: json
    mapping:
      code: kode
      stok: qty
";
    let err = parse_suppliers(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::SuppliersFileParse(_)), "got: {err:?}");
}

#[test]
fn validate_rejects_empty_name() {
    let file = SuppliersFile {
        suppliers: vec![make_supplier("   ")],
    };
    let err = validate_suppliers(&file).unwrap_err();
    assert!(err.to_string().contains("non-empty"));
}

#[test]
fn validate_rejects_duplicate_name() {
    let file = SuppliersFile {
        suppliers: vec![make_supplier("Oke Connect"), make_supplier("oke connect")],
    };
    let err = validate_suppliers(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate supplier name"));
}

#[test]
fn validate_rejects_duplicate_slug() {
    let file = SuppliersFile {
        suppliers: vec![make_supplier("Oke Connect"), make_supplier("Oke  Connect!")],
    };
    let err = validate_suppliers(&file).unwrap_err();
    assert!(err.to_string().contains("slug"));
}

#[test]
fn validate_rejects_non_http_endpoint() {
    let mut supplier = make_supplier("FTP Supplier");
    supplier.endpoint = "ftp://prices.example.com/list".to_string();
    let file = SuppliersFile {
        suppliers: vec![supplier],
    };
    let err = validate_suppliers(&file).unwrap_err();
    assert!(err.to_string().contains("http(s) URL"));
}

#[test]
fn non_canonical_status_targets_load_and_normalize_inactive() {
    let yaml = r#"
suppliers:
  - name: Supplier JSON Demo
    url_harga: https://okeconnect.example.com/harga/json
    id_oto_modul: 1
    web_response_type: json
    mapping: { code: kode, description: keterangan, price: price, status: status }
    status_mapping: { "1": "1", "0": "0" }
  - name: Supplier HTML Demo
    url_harga: https://bahara.example.com/harga.js.php
    id_oto_modul: 2
    web_response_type: html
    status_mapping: { "1": "Open", "0": "Gangguan" }
"#;
    let file = parse_suppliers(yaml).expect("vocabulary targets are not a load error");
    assert_eq!(file.suppliers.len(), 2);

    let html = &file.suppliers[1];
    let odd: Vec<(&str, &str)> = html.status_vocabulary.non_canonical_targets().collect();
    assert_eq!(odd, vec![("0", "Gangguan"), ("1", "Open")]);
    assert_eq!(html.status_vocabulary.normalize("1"), INACTIVE_STATUS);
    assert_eq!(html.status_vocabulary.normalize("open"), INACTIVE_STATUS);

    let json = &file.suppliers[0];
    assert_eq!(json.status_vocabulary.non_canonical_targets().count(), 0);
    assert_eq!(json.status_vocabulary.normalize("1"), ACTIVE_STATUS);
}

#[test]
fn find_is_case_insensitive() {
    let file = SuppliersFile {
        suppliers: vec![make_supplier("Oke Connect")],
    };
    assert!(file.find("OKE CONNECT").is_some());
    assert!(file.find("bahara").is_none());
}

#[test]
fn load_suppliers_reports_missing_file() {
    let err = load_suppliers(Path::new("/nonexistent/suppliers.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::SuppliersFileIo { .. }));
}

#[test]
fn load_suppliers_from_temp_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("suppliers.yaml");
    std::fs::write(
        &path,
        "suppliers:\n  - name: Temp\n    endpoint: http://localhost/prices\n    format: json\n",
    )
    .unwrap();
    let file = load_suppliers(&path).expect("valid file");
    assert_eq!(file.suppliers[0].name, "Temp");
}

#[test]
fn load_suppliers_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("suppliers.yaml");
    assert!(
        path.exists(),
        "suppliers.yaml missing at {path:?}; required for this test"
    );
    let result = load_suppliers(&path);
    assert!(result.is_ok(), "failed to load suppliers.yaml: {result:?}");
    assert!(!result.unwrap().suppliers.is_empty());
}
