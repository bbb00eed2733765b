//! "batch" command: ask every question in every listed space.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::api::client::SlangitClient;
use crate::core::config::Config;
use crate::core::constants::DEFAULT_RESULTS_PREFIX;
use crate::core::credentials::ApiCredentials;
use crate::core::fan_out::MultiSpaceProcessor;
use crate::core::results::{save_results, summarize, BatchEntry, FanOutResults, ReplyClassifier};
use crate::core::spaces::{SpaceDirectory, SpaceId};

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub spaces: Vec<SpaceId>,
    pub questions_file: Option<PathBuf>,
    pub questions: Vec<String>,
    pub save: bool,
    pub prefix: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
}

/// One question per line; blank lines and `#` comments are skipped.
pub fn parse_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Questions from the file (if any) followed by the inline ones.
pub fn collect_questions(
    questions_file: Option<&Path>,
    inline: &[String],
) -> Result<Vec<String>, Box<dyn Error>> {
    let mut questions = match questions_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
            parse_questions(&text)
        }
        None => Vec::new(),
    };
    questions.extend(
        inline
            .iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
    );
    Ok(questions)
}

pub async fn run_batch_command(
    options: BatchOptions,
    config: &Config,
    credentials: ApiCredentials,
) -> Result<(), Box<dyn Error>> {
    let questions = collect_questions(options.questions_file.as_deref(), &options.questions)?;
    if questions.is_empty() {
        eprintln!("❌ No questions given. Use --questions-file <path> or -q <question>.");
        std::process::exit(1);
    }

    let client = SlangitClient::new(credentials).with_language(config.language());
    let jobs = options.jobs.unwrap_or_else(|| config.jobs());
    let processor = MultiSpaceProcessor::new(&client)
        .with_classifier(ReplyClassifier::new(config.apology_markers()))
        .with_jobs(jobs);

    let directory = config.space_directory();
    println!(
        "🚀 Asking {} question(s) in {} space(s)",
        questions.len(),
        options.spaces.len()
    );
    let results = processor.process_spaces(&options.spaces, &questions).await;
    print_summary(&results, &directory);

    if options.save {
        let output_dir = options.output_dir.unwrap_or_else(|| config.output_dir());
        let prefix = options
            .prefix
            .as_deref()
            .unwrap_or(DEFAULT_RESULTS_PREFIX);
        let path = save_results(&results, &output_dir, prefix)?;
        info!(path = %path.display(), "results saved");
        println!("💾 Results saved to {}", path.display());
    }
    Ok(())
}

pub fn summary_lines(results: &FanOutResults, directory: &SpaceDirectory) -> Vec<String> {
    results
        .iter()
        .map(|(space, entries)| {
            let name = directory.display_name(space);
            let summary = summarize(entries);
            if summary.space_failed {
                let reason = entries
                    .iter()
                    .find_map(|entry| match entry {
                        BatchEntry::Failure { error } => Some(error.as_str()),
                        _ => None,
                    })
                    .unwrap_or("unknown error");
                format!("❌ {name} ({space}): {reason}")
            } else {
                let marker = if summary.failed == 0 { "✅" } else { "⚠️ " };
                format!(
                    "{marker} {name} ({space}): {} succeeded, {} failed",
                    summary.succeeded, summary.failed
                )
            }
        })
        .collect()
}

fn print_summary(results: &FanOutResults, directory: &SpaceDirectory) {
    for line in summary_lines(results, directory) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::results::{ExchangeRecord, ExchangeStatus};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn question_files_skip_blanks_and_comments() {
        let text = "# onboarding\nWhat is the leave policy?\n\n   \n  Who approves travel?  \n";
        assert_eq!(
            parse_questions(text),
            vec!["What is the leave policy?", "Who approves travel?"]
        );
    }

    #[test]
    fn file_questions_come_before_inline_ones() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "first\nsecond").unwrap();

        let questions =
            collect_questions(Some(file.path()), &["third".to_string(), "  ".to_string()])
                .unwrap();
        assert_eq!(questions, vec!["first", "second", "third"]);
    }

    #[test]
    fn missing_question_file_is_an_error() {
        let err = collect_questions(Some(Path::new("/nonexistent/questions.txt")), &[])
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn summary_reports_counts_and_space_failures() {
        let mut results = FanOutResults::new();
        results.insert(
            SpaceId(41),
            vec![
                BatchEntry::Exchange(ExchangeRecord {
                    question: "q1".to_string(),
                    answer: "a1".to_string(),
                    status: ExchangeStatus::Success,
                }),
                BatchEntry::Exchange(ExchangeRecord {
                    question: "q2".to_string(),
                    answer: "Sorry".to_string(),
                    status: ExchangeStatus::Error,
                }),
            ],
        );
        results.insert(
            SpaceId(45),
            vec![BatchEntry::Failure {
                error: "Failed to process space 45: boom".to_string(),
            }],
        );

        let lines = summary_lines(&results, &SpaceDirectory::builtin());
        assert_eq!(
            lines,
            vec![
                "⚠️  Al Bawader (41): 1 succeeded, 1 failed",
                "❌ 3F Pharma (45): Failed to process space 45: boom",
            ]
        );
    }
}
