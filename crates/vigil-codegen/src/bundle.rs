//! Pack bundling
//!
//! Merges policy modules from several pack directories into one output
//! module tree. When two input files define a top-level item with the same
//! identifier, every colliding item is renamed with its module's prefix and
//! the references inside that file are rewritten to match. The rewrite runs
//! over the whole identifier space of the file, which is deliberate: the
//! colliding names here are flat builder functions (`policies`, rule
//! constructors), not field names shared with unrelated code.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use proc_macro2::Ident;
use quote::ToTokens;
use syn::visit_mut::{self, VisitMut};
use syn::Item;
use tracing::{debug, info};

use crate::error::{CodegenError, Result};

/// Arguments for `vigil-codegen bundle`
#[derive(Debug, Args)]
pub struct BundleArgs {
    /// Input pack directories (repeatable)
    #[arg(long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for the merged module tree
    #[arg(long)]
    pub out: PathBuf,
}

/// One parsed policy module, keyed by its bundled module name
#[derive(Debug)]
pub struct PolicyModule {
    pub name: String,
    pub file: syn::File,
}

pub fn run(args: &BundleArgs) -> Result<()> {
    let mut modules = Vec::new();
    for input in &args.inputs {
        modules.extend(load_pack(input)?);
    }
    if modules.is_empty() {
        return Err(CodegenError::EmptyInput(args.inputs[0].clone()));
    }

    let modules = resolve_collisions(modules);

    fs::create_dir_all(&args.out).map_err(|e| CodegenError::io(&args.out, e))?;
    let mut mod_lines = Vec::new();
    for module in &modules {
        let target = args.out.join(format!("{}.rs", module.name));
        let source = format!(
            "// Generated by vigil-codegen bundle. Do not edit.\n{}\n",
            module.file.to_token_stream()
        );
        fs::write(&target, source).map_err(|e| CodegenError::io(&target, e))?;
        mod_lines.push(format!("pub mod {};", module.name));
    }

    let mod_rs = args.out.join("mod.rs");
    fs::write(&mod_rs, format!("{}\n", mod_lines.join("\n")))
        .map_err(|e| CodegenError::io(&mod_rs, e))?;

    info!(modules = modules.len(), out = %args.out.display(), "bundle written");
    Ok(())
}

/// Parse every policy module in a pack directory
///
/// `mod.rs` and `lib.rs` are wiring, not policy content; they are skipped
/// and regenerated on output. Module names are prefixed with the pack
/// directory name so two packs can ship files with the same stem.
fn load_pack(input: &Path) -> Result<Vec<PolicyModule>> {
    let pack = input
        .file_name()
        .map(|n| sanitize(&n.to_string_lossy()))
        .unwrap_or_else(|| "pack".to_string());

    let mut entries: Vec<PathBuf> = fs::read_dir(input)
        .map_err(|e| CodegenError::io(input, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "rs")
                && !matches!(
                    path.file_name().and_then(|n| n.to_str()),
                    Some("mod.rs") | Some("lib.rs")
                )
        })
        .collect();
    entries.sort();

    let mut modules = Vec::new();
    for path in entries {
        let source = fs::read_to_string(&path).map_err(|e| CodegenError::io(&path, e))?;
        let file = syn::parse_file(&source).map_err(|e| CodegenError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let stem = path
            .file_stem()
            .map(|s| sanitize(&s.to_string_lossy()))
            .unwrap_or_default();
        modules.push(PolicyModule {
            name: format!("{pack}_{stem}"),
            file,
        });
    }
    Ok(modules)
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Rename top-level items that collide across modules
///
/// Each colliding item gets its module name as a prefix, and every
/// reference to it inside its own file is rewritten to match.
pub fn resolve_collisions(mut modules: Vec<PolicyModule>) -> Vec<PolicyModule> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for module in &modules {
        for ident in top_level_idents(&module.file) {
            *counts.entry(ident).or_default() += 1;
        }
    }

    for module in &mut modules {
        let renames: HashMap<String, String> = top_level_idents(&module.file)
            .into_iter()
            .filter(|ident| counts.get(ident).copied().unwrap_or(0) > 1)
            .map(|ident| {
                let renamed = format!("{}_{ident}", module.name);
                debug!(module = %module.name, from = %ident, to = %renamed, "renaming");
                (ident, renamed)
            })
            .collect();

        if !renames.is_empty() {
            Renamer { renames }.visit_file_mut(&mut module.file);
        }
    }
    modules
}

/// Identifiers of items defined at the top level of a file
fn top_level_idents(file: &syn::File) -> Vec<String> {
    file.items
        .iter()
        .filter_map(|item| match item {
            Item::Fn(f) => Some(f.sig.ident.to_string()),
            Item::Struct(s) => Some(s.ident.to_string()),
            Item::Enum(e) => Some(e.ident.to_string()),
            Item::Const(c) => Some(c.ident.to_string()),
            Item::Static(s) => Some(s.ident.to_string()),
            Item::Type(t) => Some(t.ident.to_string()),
            _ => None,
        })
        .collect()
}

struct Renamer {
    renames: HashMap<String, String>,
}

impl VisitMut for Renamer {
    fn visit_ident_mut(&mut self, ident: &mut Ident) {
        if let Some(renamed) = self.renames.get(&ident.to_string()) {
            *ident = Ident::new(renamed, ident.span());
        }
        visit_mut::visit_ident_mut(self, ident);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str, source: &str) -> PolicyModule {
        PolicyModule {
            name: name.to_string(),
            file: syn::parse_file(source).unwrap(),
        }
    }

    #[test]
    fn test_colliding_items_renamed_with_module_prefix() {
        let modules = resolve_collisions(vec![
            module("aws_ec2", "pub fn policies() -> u32 { helper() }\nfn helper() -> u32 { 1 }"),
            module("aws_s3", "pub fn policies() -> u32 { 2 }"),
        ]);

        let ec2 = modules[0].file.to_token_stream().to_string();
        let s3 = modules[1].file.to_token_stream().to_string();

        assert!(ec2.contains("aws_ec2_policies"));
        assert!(s3.contains("aws_s3_policies"));
        // Unique items keep their names.
        assert!(ec2.contains("fn helper"));
    }

    #[test]
    fn test_references_inside_file_follow_the_rename() {
        let modules = resolve_collisions(vec![
            module("first", "const LIMIT: u32 = 5;\npub fn check() -> u32 { LIMIT }"),
            module("second", "const LIMIT: u32 = 9;"),
        ]);

        let first = modules[0].file.to_token_stream().to_string();
        assert!(first.contains("first_LIMIT"));
        assert!(!first.contains("{ LIMIT }"));
    }

    #[test]
    fn test_no_collisions_means_no_renames() {
        let modules = resolve_collisions(vec![
            module("only", "pub fn unique_name() {}"),
        ]);
        let out = modules[0].file.to_token_stream().to_string();
        assert!(out.contains("unique_name"));
        assert!(!out.contains("only_unique_name"));
    }
}
