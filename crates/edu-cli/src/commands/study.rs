use std::path::Path;

use anyhow::{anyhow, Context, Result};
use edu_interaction::dto::StructuredSummary;

use super::App;

pub async fn summarize(app: &App, url: &str) -> Result<()> {
    let context = app
        .session
        .summarize_video(url)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    if let Some(title) = &context.video_title {
        println!("# {}\n", title);
    }
    if let Some(summary) = &context.summary {
        print_summary(summary);
    }
    Ok(())
}

pub async fn mcq(app: &App) -> Result<()> {
    let response = app
        .session
        .generate_mcqs()
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    for (number, item) in response.mcqs.iter().enumerate() {
        println!("{}. {}", number + 1, item.question);
        for (index, option) in item.options.iter().enumerate() {
            let marker = if index == item.correct_index { '*' } else { ' ' };
            println!("  {} {}) {}", marker, option_letter(index), option);
        }
        if !item.explanation.is_empty() {
            println!("  {}", item.explanation);
        }
        println!();
    }
    Ok(())
}

pub async fn pdf(app: &App, output: &Path) -> Result<()> {
    let bytes = app
        .session
        .download_pdf()
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    std::fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn print_summary(summary: &StructuredSummary) {
    for paragraph in &summary.overview_paragraphs {
        println!("{}\n", paragraph);
    }
    print_section("Key definitions", &summary.key_definitions);
    print_section("Core concepts", &summary.core_concepts);
    print_section("Important examples", &summary.important_examples);
    print_section("Exam revision points", &summary.exam_revision_points);
}

fn print_section(heading: &str, entries: &[String]) {
    if entries.is_empty() {
        return;
    }
    println!("## {}", heading);
    for entry in entries {
        println!("- {}", entry);
    }
    println!();
}

fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
