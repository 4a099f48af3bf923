use pdfqa::Settings;
use std::env;
use tempfile::TempDir;

// Environment and working directory are process-wide, so everything that
// touches them lives in a single test.
#[test]
fn test_env_overrides_file_and_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let original_dir = env::current_dir().unwrap();
    env::set_current_dir(&temp_dir).unwrap();

    std::fs::create_dir_all(".pdfqa").unwrap();
    std::fs::write(
        ".pdfqa/settings.toml",
        "[server]\nbind = \"0.0.0.0:7000\"\n\n[qa]\nmax_chunks = 4\n",
    )
    .unwrap();

    unsafe {
        // Double underscore separates nested levels
        env::set_var("PDFQA_QA__MAX_CHUNKS", "3");
        env::set_var("PDFQA_MODEL__NAME", "gemini-1.5-pro");
        env::set_var("PDFQA_QA__CHUNKING__CHUNK_OVERLAP", "100");
    }

    let settings = Settings::load().unwrap();

    // File beats defaults
    assert_eq!(settings.server.bind, "0.0.0.0:7000");
    // Environment beats file
    assert_eq!(settings.qa.max_chunks, 3);
    assert_eq!(settings.model.name, "gemini-1.5-pro");
    assert_eq!(settings.qa.chunking.chunk_overlap, 100);
    // Untouched
    assert_eq!(settings.qa.chunking.chunk_size, 1000);
    assert_eq!(settings.qa.max_suggestions, 7);

    unsafe {
        env::remove_var("PDFQA_QA__MAX_CHUNKS");
        env::remove_var("PDFQA_MODEL__NAME");
        env::remove_var("PDFQA_QA__CHUNKING__CHUNK_OVERLAP");
    }

    env::set_current_dir(original_dir).unwrap();
}
