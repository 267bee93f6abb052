// src/pipeline.rs
use serde::Serialize;
use std::{collections::BTreeMap, fmt};
use tracing::{info, instrument, warn};

use crate::{
    config::Settings,
    error::PipelineError,
    group::{group_by_csm, group_rooftops, CsmGroup, DeskPhoneLookup, Ownership, Rooftop},
    ingest::{LoadedFile, RowMatrix},
    render::{
        copy_all, render_csm, render_dealership, render_section, CsmTemplate,
        DealershipTemplate, Kind,
    },
    resolve::{
        resolve_roles, ColumnMatch, DeskPhoneColumns, LinesColumns, Role, RoleFile,
        RooftopInfoColumns,
    },
};

/// Part of the transform that a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Role and lines-column resolution; without it no templates at all.
    Templates,
    DeskPhones,
    CsmTemplates,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Templates => "template generation",
            Stage::DeskPhones => "desk phone lookup",
            Stage::CsmTemplates => "CSM template generation",
        })
    }
}

/// One entry of the diagnostic stream handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    FileLoaded { file: String, rows: usize },
    FileFailed { file: String, error: PipelineError },
    RoleAssigned { file: String, role: Role },
    ColumnsResolved { file: String, columns: Vec<ColumnMatch> },
    ShortRowsDropped { file: String, rows: usize },
    StageAborted { stage: Stage, error: PipelineError },
    FullySkippedCsm { owner: String, rooftops: Vec<String> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FileLoaded { file, rows } => {
                write!(f, "loaded {file} ({} data row(s))", rows.saturating_sub(1))
            }
            Diagnostic::FileFailed { file, error } => write!(f, "failed to load {file}: {error}"),
            Diagnostic::RoleAssigned { file, role } => {
                write!(f, "using {file} as {}", role.label())
            }
            Diagnostic::ColumnsResolved { file, columns } => {
                write!(f, "columns in {file}:")?;
                for c in columns {
                    match &c.header {
                        Some(h) => write!(f, " {}={h:?}", c.field.label())?,
                        None => write!(f, " {}=<none>", c.field.label())?,
                    }
                }
                Ok(())
            }
            Diagnostic::ShortRowsDropped { file, rows } => {
                write!(f, "dropped {rows} short row(s) from {file}")
            }
            Diagnostic::StageAborted { stage, error } => write!(f, "skipped {stage}: {error}"),
            Diagnostic::FullySkippedCsm { owner, rooftops } => write!(
                f,
                "no low-volume lines for any rooftop of {owner}: {}",
                rooftops.join(", ")
            ),
        }
    }
}

/// CSM grouping and the templates rendered from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsmOutput {
    pub groups: Vec<CsmGroup>,
    pub templates: Vec<CsmTemplate>,
}

/// Everything one load produces. Built from scratch each time and never updated.
#[derive(Debug, Clone, Serialize)]
pub struct LoadResult {
    pub files: Vec<LoadedFile>,
    pub rooftops: Vec<Rooftop>,
    pub dealership_templates: Vec<DealershipTemplate>,
    /// `None` when the CSM stage could not run.
    pub csm: Option<CsmOutput>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadResult {
    pub fn csm_templates(&self) -> &[CsmTemplate] {
        self.csm
            .as_ref()
            .map(|c| c.templates.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_templates(&self) -> bool {
        !self.dealership_templates.is_empty() || !self.csm_templates().is_empty()
    }

    /// Card view of both template families.
    pub fn render_text(&self) -> String {
        let mut out = render_section(Kind::Dealership, &self.dealership_templates);
        if self.csm.is_some() {
            out.push('\n');
            out.push_str(&render_section(Kind::Csm, self.csm_templates()));
        }
        out
    }

    /// All bodies back to back, dealership templates first.
    pub fn copy_all_text(&self) -> String {
        let mut out = copy_all(&self.dealership_templates);
        out.push_str(&copy_all(self.csm_templates()));
        out
    }
}

#[derive(Default)]
struct Transformed {
    rooftops: Vec<Rooftop>,
    dealership_templates: Vec<DealershipTemplate>,
    csm: Option<CsmOutput>,
}

/// Run the whole transform over one load's files.
#[instrument(level = "info", skip(files, settings), fields(files = files.len()))]
pub fn generate(files: Vec<LoadedFile>, settings: &Settings) -> LoadResult {
    let mut diagnostics = Vec::new();
    let out = transform(&files, settings, &mut diagnostics);

    for d in &diagnostics {
        match d {
            Diagnostic::FileFailed { .. } | Diagnostic::StageAborted { .. } => warn!("{d}"),
            _ => info!("{d}"),
        }
    }
    info!(
        rooftops = out.rooftops.len(),
        dealership_templates = out.dealership_templates.len(),
        csm_templates = out.csm.as_ref().map_or(0, |c| c.templates.len()),
        "generated templates"
    );

    LoadResult {
        files,
        rooftops: out.rooftops,
        dealership_templates: out.dealership_templates,
        csm: out.csm,
        diagnostics,
    }
}

fn transform(files: &[LoadedFile], settings: &Settings, diags: &mut Vec<Diagnostic>) -> Transformed {
    let mut by_name: BTreeMap<&str, &RowMatrix> = BTreeMap::new();
    for f in files {
        match &f.outcome {
            Ok(m) => {
                diags.push(Diagnostic::FileLoaded {
                    file: f.name.clone(),
                    rows: m.len(),
                });
                by_name.entry(f.name.as_str()).or_insert(m);
            }
            Err(e) => diags.push(Diagnostic::FileFailed {
                file: f.name.clone(),
                error: e.clone(),
            }),
        }
    }

    let roles = match resolve_roles(&by_name) {
        Ok(r) => r,
        Err(error) => {
            diags.push(Diagnostic::StageAborted {
                stage: Stage::Templates,
                error,
            });
            return Transformed::default();
        }
    };
    for (file, role) in [
        (Some(roles.lines), Role::Lines),
        (Some(roles.rooftop_info), Role::RooftopInfo),
        (roles.desk_phones, Role::DeskPhones),
    ] {
        if let Some(file) = file {
            diags.push(Diagnostic::RoleAssigned {
                file: file.name.to_string(),
                role,
            });
        }
    }

    let lines_header = roles.lines.matrix.header();
    let lines_cols = match LinesColumns::resolve(roles.lines.name, lines_header) {
        Ok(c) => c,
        Err(error) => {
            diags.push(Diagnostic::StageAborted {
                stage: Stage::Templates,
                error,
            });
            return Transformed::default();
        }
    };
    diags.push(Diagnostic::ColumnsResolved {
        file: roles.lines.name.to_string(),
        columns: lines_cols.matches(lines_header),
    });

    let desk = roles.desk_phones.and_then(|f| desk_phone_lookup(f, diags));
    let grouped = group_rooftops(roles.lines.matrix, &lines_cols, desk.as_ref());
    if grouped.short_rows > 0 {
        diags.push(Diagnostic::ShortRowsDropped {
            file: roles.lines.name.to_string(),
            rows: grouped.short_rows,
        });
    }

    let dealership_templates = grouped.rooftops.iter().map(render_dealership).collect();
    let csm = csm_stage(roles.rooftop_info, &grouped.rooftops, settings, diags);

    Transformed {
        rooftops: grouped.rooftops,
        dealership_templates,
        csm,
    }
}

fn desk_phone_lookup(file: RoleFile<'_>, diags: &mut Vec<Diagnostic>) -> Option<DeskPhoneLookup> {
    let header = file.matrix.header();
    match DeskPhoneColumns::resolve(file.name, header) {
        Ok(cols) => {
            diags.push(Diagnostic::ColumnsResolved {
                file: file.name.to_string(),
                columns: cols.matches(header),
            });
            Some(DeskPhoneLookup::from_matrix(file.matrix, &cols))
        }
        Err(error) => {
            diags.push(Diagnostic::StageAborted {
                stage: Stage::DeskPhones,
                error,
            });
            None
        }
    }
}

/// Group by CSM and render. Runs after, but does not feed, the dealership templates.
fn csm_stage(
    file: RoleFile<'_>,
    rooftops: &[Rooftop],
    settings: &Settings,
    diags: &mut Vec<Diagnostic>,
) -> Option<CsmOutput> {
    let header = file.matrix.header();
    let cols = match RooftopInfoColumns::resolve(file.name, header) {
        Ok(c) => c,
        Err(error) => {
            diags.push(Diagnostic::StageAborted {
                stage: Stage::CsmTemplates,
                error,
            });
            return None;
        }
    };
    diags.push(Diagnostic::ColumnsResolved {
        file: file.name.to_string(),
        columns: cols.matches(header),
    });

    let ownership = Ownership::from_matrix(file.matrix, &cols);
    let groups = group_by_csm(&ownership, rooftops, &settings.unknown_csm);
    for g in groups.iter().filter(|g| g.is_fully_skipped()) {
        diags.push(Diagnostic::FullySkippedCsm {
            owner: g.owner.clone(),
            rooftops: g.skipped.clone(),
        });
    }
    let templates = groups.iter().filter_map(render_csm).collect();
    Some(CsmOutput { groups, templates })
}
