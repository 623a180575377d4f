use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::{BatchResult, ReelReport};

/// Save a batch result to file
pub async fn save_to_file(result: &BatchResult, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Text => format_as_text(result),
        OutputFormat::Json => format_as_json(result)?,
    };

    fs_err::write(path, content)?;
    Ok(())
}

/// Print a batch result to console
pub fn print_to_console(result: &BatchResult, format: &OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Text => format_as_text(result),
        OutputFormat::Json => format_as_json(result)?,
    };

    println!("{}", content);
    Ok(())
}

/// Flat-text rendering: one labeled block per report, separated by a dashed
/// line, suitable for direct export.
pub fn format_as_text(result: &BatchResult) -> String {
    let mut lines = Vec::new();

    for report in &result.reports {
        lines.push(format!("🔗 URL: {}", report.url));
        lines.push(format!(
            "📊 Plays: {} | Likes: {} | Comments: {}",
            report.play_count, report.like_count, report.comment_count
        ));
        lines.push(format!("💬 Script:\n{}", report.script.rendered()));
        lines.push(format!("🎧 Subtitles:\n{}", report.subtitles.rendered()));
        lines.push(format!(
            "🖼️ Visual Summary:\n{}",
            report.visual_description.rendered()
        ));
        lines.push(format!("{}\n", "-".repeat(50)));
    }

    lines.join("\n")
}

/// JSON rendering: an array of records with rendered field values.
pub fn format_as_json(result: &BatchResult) -> Result<String> {
    let records: Vec<serde_json::Value> = result.reports.iter().map(report_record).collect();

    let document = serde_json::json!({
        "completed_at": result.completed_at.to_rfc3339(),
        "reports": records,
    });

    Ok(serde_json::to_string_pretty(&document)?)
}

fn report_record(report: &ReelReport) -> serde_json::Value {
    serde_json::json!({
        "url": report.url,
        "play_count": report.play_count,
        "like_count": report.like_count,
        "comment_count": report.comment_count,
        "script": report.script.rendered(),
        "subtitles": report.subtitles.rendered(),
        "visual_description": report.visual_description.rendered(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageOutput;
    use chrono::Utc;

    fn sample_result() -> BatchResult {
        BatchResult {
            reports: vec![
                ReelReport {
                    url: "https://www.instagram.com/p/a/".to_string(),
                    comment_count: 12,
                    like_count: 340,
                    play_count: 2_000_000,
                    script: StageOutput::Text("HOOK: watch this".to_string()),
                    subtitles: StageOutput::Text("hello world".to_string()),
                    visual_description: StageOutput::Text("N/A".to_string()),
                },
                ReelReport {
                    url: "https://www.instagram.com/p/b/".to_string(),
                    comment_count: 0,
                    like_count: 0,
                    play_count: 1_500_000,
                    script: StageOutput::Error("Transcription failed. No script generated.".to_string()),
                    subtitles: StageOutput::Error("No audio stream resolved".to_string()),
                    visual_description: StageOutput::Text("N/A".to_string()),
                },
            ],
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_text_format_has_one_block_per_report() {
        let text = format_as_text(&sample_result());
        assert_eq!(text.matches("🔗 URL:").count(), 2);
        assert_eq!(text.matches(&"-".repeat(50)).count(), 2);
    }

    #[test]
    fn test_text_format_includes_all_field_labels() {
        let text = format_as_text(&sample_result());
        for label in ["🔗 URL:", "📊 Plays:", "💬 Script:", "🎧 Subtitles:", "🖼️ Visual Summary:"] {
            assert!(text.contains(label), "missing label {label}");
        }
    }

    #[test]
    fn test_text_format_marks_failures() {
        let text = format_as_text(&sample_result());
        assert!(text.contains("⚠️ No audio stream resolved"));
        assert!(text.contains("⚠️ Transcription failed. No script generated."));
    }

    #[test]
    fn test_json_format_renders_records() {
        let json = format_as_json(&sample_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let reports = value["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["url"], "https://www.instagram.com/p/a/");
        assert_eq!(reports[0]["play_count"], 2_000_000);
        assert_eq!(reports[1]["subtitles"], "⚠️ No audio stream resolved");
    }

    #[test]
    fn test_empty_batch_renders_empty_text() {
        let result = BatchResult::empty();
        assert!(format_as_text(&result).is_empty());
    }
}
