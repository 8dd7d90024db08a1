// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::analysis::{AreaStatistics, ClassificationSummary};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report the classification of one scan
    pub fn report_analysis(
        file: &str,
        triangles: usize,
        summary: &ClassificationSummary,
        area: Option<&AreaStatistics>,
        duration: Duration,
    ) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Analyzed:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        Self::print_count("Triangles", triangles);
        Self::print_count("Feature points", summary.points);
        println!("\n{}", "Categories:".bold());
        println!(
            "  {} {}",
            "contour:".bright_black(),
            summary.contour.to_string().white().bold()
        );
        println!(
            "  {} {}",
            "border:".bright_black(),
            summary.border.to_string().red()
        );
        println!(
            "  {} {}",
            "border1:".bright_black(),
            summary.border1.to_string().green()
        );
        println!(
            "  {} {} {}",
            "flagged:".bright_black(),
            summary.flagged.to_string().cyan(),
            format!("({})", Self::format_share(summary.flagged, summary.points)).bright_black()
        );

        if let Some(stats) = area {
            println!("\n{}", "Face areas:".bold());
            println!(
                "  {} {:.5} / {:.5} / {:.5}",
                "min / avg / max:".bright_black(),
                stats.min_area,
                stats.average_area,
                stats.max_area
            );
            match stats.refined {
                Some(refined) => println!(
                    "  {} [{:.5}, {:.5}] over {} faces",
                    "refined band:".bright_black(),
                    refined.min_area,
                    refined.average_area,
                    refined.face_count
                ),
                None => println!("  {} {}", "refined band:".bright_black(), "empty".yellow()),
            }
        }

        println!("\n{}", "Performance:".bold());
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report a finished render
    pub fn report_render(output: &str, frames: u64, collision: bool, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Rendered:".bold(), output.cyan());
        println!("{}", "━".repeat(80).bright_black());
        Self::print_count("Frames", frames as usize);
        if collision {
            println!("  {} {}", "Collision:".bright_black(), "yes".red().bold());
        } else {
            println!("  {} {}", "Collision:".bright_black(), "no".green());
        }
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_count(name: &str, value: usize) {
        println!(
            "  {} {}",
            format!("{}:", name).bright_black(),
            value.to_string().cyan()
        );
    }

    fn format_share(part: usize, total: usize) -> String {
        if total == 0 {
            return "0.0%".to_string();
        }
        format!("{:.1}%", part as f64 / total as f64 * 100.0)
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
