//! Policy scaffolding
//!
//! Renders a new policy module from a template and wires it into the pack's
//! `mod.rs` when one is present. The generated file carries TODO markers at
//! the two places the author must fill in: the description and the
//! predicate body.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use tracing::info;
use vigil_core::validate_policy_name;

use crate::error::{CodegenError, Result};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VendorArg {
    Aws,
    Kubernetes,
}

impl VendorArg {
    fn variant(self) -> &'static str {
        match self {
            Self::Aws => "Aws",
            Self::Kubernetes => "Kubernetes",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SeverityArg {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityArg {
    fn variant(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

/// Arguments for `vigil-codegen new-policy`
#[derive(Debug, Args)]
pub struct NewPolicyArgs {
    /// Policy name (lowercase, hyphen-delimited)
    #[arg(long)]
    pub name: String,

    /// Vendor the policy applies to
    #[arg(long)]
    pub vendor: VendorArg,

    /// Vendor service, e.g. "ec2"
    #[arg(long)]
    pub service: String,

    /// Violation severity
    #[arg(long)]
    pub severity: SeverityArg,

    /// Topic tags (repeatable)
    #[arg(long = "topic")]
    pub topics: Vec<String>,

    /// Provider resource type the rule inspects
    #[arg(long)]
    pub resource_type: String,

    /// Directory to write the module into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

/// Render and write the policy module, updating `mod.rs` if present
pub fn run(args: &NewPolicyArgs) -> Result<()> {
    validate_policy_name(&args.name)?;

    let module_name = args.name.replace('-', "_");
    let target = args.out.join(format!("{module_name}.rs"));
    if target.exists() {
        return Err(CodegenError::OutputExists(target));
    }

    fs::create_dir_all(&args.out).map_err(|e| CodegenError::io(&args.out, e))?;
    fs::write(&target, render(args)).map_err(|e| CodegenError::io(&target, e))?;
    info!(path = %target.display(), "wrote policy scaffold");

    wire_module(&args.out, &module_name)?;
    Ok(())
}

fn render(args: &NewPolicyArgs) -> String {
    let fn_name = args.name.replace('-', "_");
    let topics_chain = if args.topics.is_empty() {
        String::new()
    } else {
        let quoted: Vec<String> = args.topics.iter().map(|t| format!("\"{t}\"")).collect();
        format!("\n            .with_topics([{}])", quoted.join(", "))
    };

    format!(
        r#"//! {name}

use std::sync::Arc;

use vigil_core::{{PolicyMetadata, PolicyRecord, Severity, Vendor}};

pub fn {fn_name}() -> PolicyRecord {{
    PolicyRecord::new(
        "{name}",
        "TODO: describe what this rule checks.",
        PolicyMetadata::new(Vendor::{vendor}, Severity::{severity})
            .with_service("{service}"){topics_chain},
        Arc::new(|resource, reporter| {{
            if !resource.is_type("{resource_type}") {{
                return;
            }}
            // TODO: inspect resource.properties and report violations.
            let _ = reporter;
        }}),
    )
}}
"#,
        name = args.name,
        fn_name = fn_name,
        vendor = args.vendor.variant(),
        severity = args.severity.variant(),
        service = args.service,
        resource_type = args.resource_type,
        topics_chain = topics_chain,
    )
}

/// Append a `pub mod` line to the pack's `mod.rs`, if the pack has one
fn wire_module(out: &Path, module_name: &str) -> Result<()> {
    let mod_rs = out.join("mod.rs");
    if !mod_rs.exists() {
        return Ok(());
    }

    let mut contents = fs::read_to_string(&mod_rs).map_err(|e| CodegenError::io(&mod_rs, e))?;
    let line = format!("pub mod {module_name};");
    if contents.lines().any(|l| l.trim() == line) {
        return Ok(());
    }

    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&line);
    contents.push('\n');
    fs::write(&mod_rs, contents).map_err(|e| CodegenError::io(&mod_rs, e))?;
    info!(path = %mod_rs.display(), module = module_name, "wired module");
    Ok(())
}
