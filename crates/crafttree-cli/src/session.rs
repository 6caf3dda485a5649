//! Line-oriented command session over a registry.

use crate::cli::OutputFormat;
use crafttree_core::exploit::{ExploitVerdict, analyze_exploit};
use crafttree_core::graph_view::build_dependency_graph;
use crafttree_core::linear::SolutionSet;
use crafttree_core::{CraftError, Registry, total_requirements};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt::Write;

/// One parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Base(String),
    Craft { name: String, recipe: String },
    Graph(String),
    Dot(String),
    Totals(String),
    Exploit(String),
    List,
    Help,
}

/// Errors from parsing or running a command line.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Craft(#[from] CraftError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, SessionError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let target = |usage: &'static str| {
        if rest.is_empty() {
            Err(SessionError::Usage(usage))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "base" => Command::Base(target("base <name>")?),
        "craft" => {
            let (name, recipe) = rest
                .split_once('=')
                .ok_or(SessionError::Usage("craft <name> = <ingredient:qty, ...>"))?;
            Command::Craft {
                name: name.trim().to_string(),
                recipe: recipe.trim().to_string(),
            }
        }
        "graph" => Command::Graph(target("graph <target>")?),
        "dot" => Command::Dot(target("dot <target>")?),
        "totals" => Command::Totals(target("totals <target>")?),
        "exploit" => Command::Exploit(target("exploit <target>")?),
        "list" => Command::List,
        "help" => Command::Help,
        other => return Err(SessionError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// A quantity as JSON: a number while it fits in `u64`, otherwise its
/// decimal string.
fn quantity_json(value: &BigUint) -> Value {
    match value.to_u64() {
        Some(small) => json!(small),
        None => json!(value.to_string()),
    }
}

fn quantities_json(values: &BTreeMap<String, BigUint>) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(name, value)| (name.clone(), quantity_json(value)))
            .collect(),
    )
}

const HELP: &str = "\
commands:
  base <name>                          register a base material
  craft <name> = <ingredient:qty, ...> register or replace a craftable
  graph <target>                       list dependency edges
  dot <target>                         dependency graph as Graphviz DOT
  totals <target>                      base materials for one unit
  exploit <target>                     detect resource exploits
  list                                 show registered items
  help                                 show this message";

/// Owns the registry for the lifetime of a session.
pub struct Session {
    registry: Registry,
    format: OutputFormat,
}

impl Session {
    pub fn new(registry: Registry, format: OutputFormat) -> Self {
        Self { registry, format }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse and run one line, returning the text to print (if any).
    pub fn run_line(&mut self, line: &str) -> Result<Option<String>, SessionError> {
        match parse_command(line)? {
            Some(command) => self.execute(command).map(Some),
            None => Ok(None),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<String, SessionError> {
        let json_mode = self.format == OutputFormat::Json;
        let out = match command {
            Command::Base(name) => {
                self.registry.add_base_material(&name)?;
                if json_mode {
                    json!({ "registered": name.trim(), "kind": "base" }).to_string()
                } else {
                    format!("added base material '{}'", name.trim())
                }
            }
            Command::Craft { name, recipe } => {
                self.registry.add_craftable(&name, &recipe)?;
                if json_mode {
                    json!({ "registered": name.trim(), "kind": "craftable" }).to_string()
                } else {
                    format!("added craftable '{}'", name.trim())
                }
            }
            Command::Graph(target) => {
                let graph = build_dependency_graph(&self.registry, &target)?;
                if json_mode {
                    serde_json::to_string(&graph)?
                } else {
                    let mut out = format!("Crafting tree for '{}':", graph.root());
                    for (from, to) in graph.edges() {
                        let _ = write!(out, "\n  {from} -> {to}");
                    }
                    out
                }
            }
            Command::Dot(target) => build_dependency_graph(&self.registry, &target)?
                .to_dot()
                .trim_end()
                .to_string(),
            Command::Totals(target) => {
                let totals = total_requirements(&self.registry, &target)?;
                if json_mode {
                    json!({ "target": target.trim(), "requirements": quantities_json(&totals) })
                        .to_string()
                } else {
                    let mut out = String::from("Total Base Material Requirements:");
                    for (material, amount) in &totals {
                        let _ = write!(out, "\n  {material}: {amount}");
                    }
                    out
                }
            }
            Command::Exploit(target) => {
                let report = analyze_exploit(&self.registry, &target)?;
                if json_mode {
                    let equation: serde_json::Map<String, Value> = report
                        .equation
                        .iter()
                        .map(|(name, coefficient)| (name.clone(), json!(coefficient.to_string())))
                        .collect();
                    json!({
                        "target": report.target,
                        "verdict": report.verdict,
                        "equation": equation,
                        "rank": report.rank,
                    })
                    .to_string()
                } else {
                    let lhs = report
                        .equation
                        .iter()
                        .map(|(name, coefficient)| format!("{coefficient}*{name}"))
                        .collect::<Vec<_>>()
                        .join(" + ");
                    let verdict = match report.verdict {
                        ExploitVerdict::ExploitDetected => {
                            "Resource exploit detected: multiple distinct solutions exist for crafting the target item."
                        }
                        ExploitVerdict::NoExploit => "No resource exploits detected.",
                    };
                    let detail = match &report.solutions {
                        SolutionSet::Infinite { free_variables } => {
                            format!("\n  free: {}", free_variables.join(", "))
                        }
                        _ => String::new(),
                    };
                    format!(
                        "{verdict}\n  equation: {lhs} = 1\n  rank: {} of {} variables{detail}",
                        report.rank,
                        report.equation.len()
                    )
                }
            }
            Command::List => {
                let bases = self.registry.list_base_materials();
                let craftables = self.registry.list_craftables();
                if json_mode {
                    let craftables: serde_json::Map<String, Value> = craftables
                        .iter()
                        .map(|(name, recipe)| (name.clone(), quantities_json(recipe)))
                        .collect();
                    json!({ "base_materials": bases, "craftables": craftables }).to_string()
                } else {
                    let mut out = String::from("Base Materials:");
                    for base in &bases {
                        let _ = write!(out, "\n  {base}");
                    }
                    out.push_str("\nCraftable Items:");
                    for (name, recipe) in &craftables {
                        let spec = recipe
                            .iter()
                            .map(|(item, qty)| format!("{item}:{qty}"))
                            .collect::<Vec<_>>()
                            .join(", ");
                        let _ = write!(out, "\n  {name}: {spec}");
                    }
                    out
                }
            }
            Command::Help => HELP.to_string(),
        };
        Ok(out)
    }
}
