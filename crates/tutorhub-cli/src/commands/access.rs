//! Access assignment and report commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use tutorhub_core::error::AppError;
use tutorhub_core::types::MaterialId;
use tutorhub_entity::visibility::AccessReport;
use tutorhub_service::access::AccessPropagationEngine;
use tutorhub_service::material::MaterialListingService;

/// Arguments for access commands
#[derive(Debug, Args)]
pub struct AccessArgs {
    /// Access subcommand
    #[command(subcommand)]
    pub command: AccessCommand,
}

/// Access subcommands
#[derive(Debug, Subcommand)]
pub enum AccessCommand {
    /// Replace the explicit student set of a material
    Set {
        /// Material ID
        material_id: i64,
        /// Comma-separated student IDs; empty revokes everyone
        #[arg(short, long, default_value = "")]
        students: String,
    },
    /// Show the owner's roster with per-student access
    Report {
        /// Material ID
        material_id: i64,
    },
}

/// Flattened report line
#[derive(Debug, Serialize, Tabled)]
struct ReportRow {
    /// Course name
    course: String,
    /// Group name
    group: String,
    /// Student ID
    student_id: i64,
    /// Full name
    name: String,
    /// Explicit grant on the material
    access: bool,
}

/// Comma-separated ids as the JSON array the engine accepts.
fn student_payload(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
    )
}

fn report_rows(report: &AccessReport) -> Vec<ReportRow> {
    report
        .courses
        .iter()
        .flat_map(|course| {
            course.groups.iter().flat_map(move |group| {
                group.students.iter().map(move |student| ReportRow {
                    course: course.course_name.clone(),
                    group: group.group_name.clone(),
                    student_id: student.student_id.get(),
                    name: format!("{} {}", student.first_name, student.last_name),
                    access: student.has_access_to_material,
                })
            })
        })
        .collect()
}

/// Execute access commands
pub async fn execute(
    args: &AccessArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let stores = super::open_stores(config_path).await?;

    match &args.command {
        AccessCommand::Set {
            material_id,
            students,
        } => {
            let id = MaterialId::positive(*material_id).ok_or_else(|| {
                AppError::validation(format!("Invalid material id: {material_id}"))
            })?;
            let engine = AccessPropagationEngine::new(stores.visibility.clone());
            let change = engine.set_access_json(id, &student_payload(students)).await?;

            match format {
                OutputFormat::Json => output::print_json(&change),
                OutputFormat::Table => output::print_success(&change.summary()),
            }
        }
        AccessCommand::Report { material_id } => {
            let id = MaterialId::positive(*material_id).ok_or_else(|| {
                AppError::validation(format!("Invalid material id: {material_id}"))
            })?;
            let listing = MaterialListingService::new(
                stores.materials.clone(),
                stores.visibility.clone(),
                stores.directory.clone(),
            );
            let report = listing.access_report(id).await?;

            match format {
                OutputFormat::Json => output::print_json(&report),
                OutputFormat::Table => output::print_list(&report_rows(&report), format),
            }
        }
    }

    Ok(())
}
