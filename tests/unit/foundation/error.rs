use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StripError::invalid_input("x")
            .to_string()
            .contains("invalid input:")
    );
    assert!(
        StripError::invalid_geometry("x")
            .to_string()
            .contains("invalid geometry:")
    );
    assert!(StripError::encode("x").to_string().contains("encode failure:"));
    assert!(StripError::render("x").to_string().contains("render error:"));
    assert!(StripError::config("x").to_string().contains("config error:"));
}

#[test]
fn source_decode_names_the_file() {
    let err = StripError::source_decode("march.jpg", "truncated stream");
    let msg = err.to_string();
    assert!(msg.contains("march.jpg"));
    assert!(msg.contains("truncated stream"));
}

#[test]
fn all_sources_failed_reports_count() {
    let err = StripError::AllSourcesFailed { count: 4 };
    assert_eq!(err.to_string(), "all 4 sources failed to decode");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StripError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
