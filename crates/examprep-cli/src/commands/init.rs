//! The `examprep init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examprep.toml").exists() {
        println!("examprep.toml already exists, skipping.");
        return Ok(());
    }
    std::fs::write("examprep.toml", SAMPLE_CONFIG)?;
    println!("Created examprep.toml");

    println!("\nNext steps:");
    println!("  1. Adjust [remote] if you use a different past-paper site");
    println!("  2. Run: examprep papers --subject Maths --term \"First term\"");
    println!("  3. Run: examprep practice --subject Maths --term \"First term\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examprep configuration

[remote]
enabled = true
base_url = "https://pastpapers.wiki"
index_path = "/grade-09-term-test-papers-past-papers-short-notes-2/"
request_timeout_secs = 20
document_timeout_secs = 35
max_subpages = 12
max_documents_per_page = 3
max_document_pages = 25
concurrency = 4

[cache]
# scraped papers
remote_ttl_secs = 21600
# generated papers
synthetic_ttl_secs = 1800

[sessions]
# idle_ttl_secs = 3600
"#;
