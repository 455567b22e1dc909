//! gadgetsmith: command-line front end.
//!
//! Thin dispatcher over the library. Structured results are printed as JSON
//! on stdout; `render` prints the final command text, ready to hand to a
//! shell. Errors go to stderr with exit status 1.

use std::collections::BTreeMap;
use std::process::ExitCode;

use gadgetsmith::config::Config;
use gadgetsmith::store::{GadgetStore, GadgetUpdate};
use gadgetsmith::{Analyzer, logging, template};

const USAGE: &str = "\
usage: gadgetsmith <command> [args]

commands:
  analyze [--refresh] <command...>     suggest placeholders for a command
  add <name> <command> [description] [var=description...]
                                       save a gadget
  edit <name> [--name N] [--description D] [--command C]
       [--rename-var old=new] [--describe-var var=text]
                                       change a gadget
  list                                 list saved gadgets
  show <name>                          show one gadget
  delete <name>                        delete a gadget
  render <name> [value...] [key=value...]
                                       print the command with values filled in
  --dump-config                        print the effective configuration";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load();
    logging::init(&config);

    match run(&config, &args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("gadgetsmith: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: &[String]) -> Result<String, String> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(USAGE.to_string());
    };

    match command.as_str() {
        "analyze" => {
            let (refresh, words) = match rest.split_first() {
                Some((flag, words)) if flag == "--refresh" => (true, words),
                _ => (false, rest),
            };
            let text = words.join(" ");
            if text.trim().is_empty() {
                return Err("analyze needs a command".into());
            }
            log::info!("analyze: {}", logging::summarize(&text));
            let mut analyzer = Analyzer::from_config(config);
            if refresh {
                let count = analyzer.oracle_mut().reload();
                log::info!("command list refreshed: {count} names");
            }
            let analysis = analyzer.analyze(&text).map_err(|e| e.to_string())?;
            to_json(&analysis)
        }
        "add" => {
            let [name, command, extra @ ..] = rest else {
                return Err(
                    "usage: add <name> <command> [description] [var=description...]".into(),
                );
            };
            let (description, variables) = split_add_args(command, extra);
            let mut store = open_store(config)?;
            store
                .create(name, command, &description, variables)
                .map_err(|e| e.to_string())?;
            show(&store, name)
        }
        "edit" => {
            let Some((name, flags)) = rest.split_first() else {
                return Err("usage: edit <name> [--name N] [--description D] [--command C] \
                            [--rename-var old=new] [--describe-var var=text]"
                    .into());
            };
            let update = parse_edit(flags)?;
            let mut store = open_store(config)?;
            let name = store.edit(name, update).map_err(|e| e.to_string())?;
            show(&store, &name)
        }
        "list" => {
            let store = open_store(config)?;
            let listing: BTreeMap<&str, &str> = store
                .list()
                .map(|(name, g)| (name, g.description.as_str()))
                .collect();
            to_json(&listing)
        }
        "show" => {
            let [name] = rest else {
                return Err("usage: show <name>".into());
            };
            show(&open_store(config)?, name)
        }
        "delete" => {
            let [name] = rest else {
                return Err("usage: delete <name>".into());
            };
            let mut store = open_store(config)?;
            store.delete(name).map_err(|e| e.to_string())?;
            to_json(&serde_json::json!({ "deleted": name }))
        }
        "render" => {
            let Some((name, values)) = rest.split_first() else {
                return Err("usage: render <name> [value...] [key=value...]".into());
            };
            let store = open_store(config)?;
            let gadget = store.get(name).map_err(|e| e.to_string())?;
            let (positional, named) = split_values(values);
            let bound = gadget.bind_arguments(&positional, &named);
            let missing = gadget.missing_values(&bound);
            if !missing.is_empty() {
                return Err(format!("missing values for: {}", missing.join(", ")));
            }
            Ok(gadget.render(&bound))
        }
        "--dump-config" => toml::to_string_pretty(config).map_err(|e| e.to_string()),
        "-h" | "--help" | "help" => Ok(USAGE.to_string()),
        other => Err(format!("unknown command '{other}'\n{USAGE}")),
    }
}

fn open_store(config: &Config) -> Result<GadgetStore, String> {
    GadgetStore::from_config(config).map_err(|e| e.to_string())
}

fn show(store: &GadgetStore, name: &str) -> Result<String, String> {
    let gadget = store.get(name).map_err(|e| e.to_string())?;
    let variables: BTreeMap<String, String> = gadget
        .placeholders()
        .into_iter()
        .map(|v| {
            let desc = gadget.variable_description(&v);
            (v, desc)
        })
        .collect();
    to_json(&serde_json::json!({
        "name": name,
        "description": gadget.description,
        "command": gadget.command,
        "variables": variables,
        "unused_variables": gadget.stale_variables(),
    }))
}

/// Split the trailing `add` arguments into the gadget description and
/// variable descriptions. `var=text` counts as a variable description only
/// when `var` is a placeholder of `command`; everything else is joined into
/// the description.
fn split_add_args(command: &str, extra: &[String]) -> (String, BTreeMap<String, String>) {
    let placeholders = template::extract_placeholders(command);
    let mut description = Vec::new();
    let mut variables = BTreeMap::new();
    for arg in extra {
        match arg.split_once('=') {
            Some((key, text)) if placeholders.iter().any(|p| p == key) => {
                variables.insert(key.to_string(), text.to_string());
            }
            _ => description.push(arg.as_str()),
        }
    }
    (description.join(" "), variables)
}

fn parse_edit(flags: &[String]) -> Result<GadgetUpdate, String> {
    let mut update = GadgetUpdate::default();
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("{flag} needs a value"))?;
        update = match flag.as_str() {
            "--name" => update.rename(value),
            "--description" => update.describe(value),
            "--command" => update.command(value),
            "--rename-var" => {
                let (from, to) = split_pair(flag, value)?;
                update.rename_variable(from, to)
            }
            "--describe-var" => {
                let (var, text) = split_pair(flag, value)?;
                update.describe_variable(var, text)
            }
            other => return Err(format!("unknown edit option '{other}'")),
        };
    }
    if update.is_empty() {
        return Err("edit needs at least one change".into());
    }
    Ok(update)
}

fn split_pair<'a>(flag: &str, value: &'a str) -> Result<(&'a str, &'a str), String> {
    value
        .split_once('=')
        .ok_or_else(|| format!("{flag} expects name=value, got '{value}'"))
}

/// `key=value` arguments with a placeholder-shaped key are named values;
/// everything else is positional.
fn split_values(values: &[String]) -> (Vec<String>, BTreeMap<String, String>) {
    let mut positional = Vec::new();
    let mut named = BTreeMap::new();
    for value in values {
        match value.split_once('=') {
            Some((key, v)) if template::is_placeholder_name(key) => {
                named.insert(key.to_string(), v.to_string());
            }
            _ => positional.push(value.clone()),
        }
    }
    (positional, named)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_args_split_variable_descriptions() {
        let (description, variables) = split_add_args(
            "scp {{file}} {{host}}:",
            &args(&["copy", "to", "a=b", "host=target machine"]),
        );
        assert_eq!(description, "copy to a=b");
        assert_eq!(variables.len(), 1);
        assert_eq!(variables["host"], "target machine");
    }

    #[test]
    fn add_args_without_extras() {
        let (description, variables) = split_add_args("ls", &[]);
        assert!(description.is_empty());
        assert!(variables.is_empty());
    }

    #[test]
    fn edit_flags_build_update() {
        let update = parse_edit(&args(&[
            "--name",
            "copy",
            "--command",
            "cp {{src}} {{dst}}",
            "--rename-var",
            "src=from",
            "--describe-var",
            "dst=where it goes",
        ]))
        .unwrap();
        let expected = GadgetUpdate::default()
            .rename("copy")
            .command("cp {{src}} {{dst}}")
            .rename_variable("src", "from")
            .describe_variable("dst", "where it goes");
        assert_eq!(update, expected);
    }

    #[test]
    fn edit_flag_errors() {
        assert!(parse_edit(&[]).is_err());
        assert!(parse_edit(&args(&["--name"])).is_err());
        assert!(parse_edit(&args(&["--rename-var", "nopair"])).is_err());
        assert!(parse_edit(&args(&["--colour", "red"])).is_err());
    }

    #[test]
    fn render_values_split_named_and_positional() {
        let (positional, named) = split_values(&args(&["a", "dir=/tmp", "x y=z"]));
        assert_eq!(positional, vec!["a", "x y=z"]);
        assert_eq!(named["dir"], "/tmp");
    }
}
