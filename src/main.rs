//! doorkey - host-side door lock simulator
//!
//! Reads one command per line from stdin, standing in for the reader and the
//! enrollment menu of the lock:
//!
//! ```text
//! add NAME              create an unbound slot
//! bind INDEX BYTES..    bind a scanned tag to a slot
//! enroll NAME BYTES..   create a bound entry (NAME is one word; use add +
//!                       bind for longer names)
//! scan BYTES..          present a tag
//! unbind INDEX | remove INDEX | list | migrate ENCODING | save
//! ```
//!
//! BYTES are hex octets (`04 3a ff` or `04:3a:ff`). Results go to stdout one
//! line each, diagnostics to the log. Diagnostics name the command only, never
//! the tag bytes typed after it.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, warn};
use zeroize::Zeroizing;

use doorkey::{AccessDecision, Encoding, IdentityToken, OversizePolicy, Policy, Registry};

#[derive(Parser, Debug)]
#[command(version, about = "RFID door lock allow-list simulator")]
struct Args {
    /// Registry snapshot, loaded at start if present and written by `save`
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Encoding for a new registry (hex, legacy-mixed, legacy-decimal)
    #[arg(long, default_value = "hex")]
    encoding: Encoding,

    /// Reject readings longer than a token instead of truncating them
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("doorkey v{} starting", env!("CARGO_PKG_VERSION"));

    let policy = Policy {
        oversize: if args.strict {
            OversizePolicy::Reject
        } else {
            OversizePolicy::Truncate
        },
        storage_encoding: args.encoding,
    };

    let mut registry = match &args.registry {
        Some(path) if path.exists() => load(path)?,
        _ => policy.new_registry(),
    };
    if let Some(note) = encoding_override_note(args.encoding, registry.encoding()) {
        info!("{}", note);
    }
    info!(
        "Registry ready: {} entries, {} encoding",
        registry.len(),
        registry.encoding()
    );

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = execute(&mut registry, &policy, line, args.registry.as_deref()) {
            warn!("{}", diagnostic(line, &e));
            println!("error: {:#}", e);
        }
    }

    Ok(())
}

fn execute(
    registry: &mut Registry,
    policy: &Policy,
    line: &str,
    path: Option<&Path>,
) -> anyhow::Result<()> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let rest: Vec<&str> = words.collect();

    match command {
        "add" => {
            let name = rest.join(" ");
            if name.is_empty() {
                bail!("add needs a name");
            }
            let index = registry.add_slot(name);
            println!("slot {}", index);
        }
        "bind" => {
            let (index, bytes) = rest.split_first().context("bind needs an index")?;
            let index: usize = index.parse().context("invalid index")?;
            let token = read_tag(policy, bytes)?;
            registry.bind(index, &token)?;
            println!("bound {} {}", index, token.display(registry.encoding()));
        }
        "enroll" => {
            let (name, bytes) = rest.split_first().context("enroll needs a name")?;
            let token = read_tag(policy, bytes)
                .context("enroll takes a one-word name followed by hex octets")?;
            let index = registry.enroll(*name, &token)?;
            println!("enrolled {} {}", index, token.display(registry.encoding()));
        }
        "scan" => {
            let token = read_tag(policy, &rest)?;
            match registry.check(&token) {
                AccessDecision::Granted { index } => {
                    let name = registry.get(index).map(|m| m.name()).unwrap_or_default();
                    println!("granted {} {}", index, name);
                }
                AccessDecision::Denied => println!("denied"),
                AccessDecision::NoCredential => println!("no credential"),
            }
        }
        "unbind" => {
            let index: usize = rest.first().context("unbind needs an index")?.parse()?;
            registry.unbind(index)?;
            println!("unbound {}", index);
        }
        "remove" => {
            let index: usize = rest.first().context("remove needs an index")?.parse()?;
            let member = registry.remove(index)?;
            println!("removed {} {}", index, member.name());
        }
        "list" => {
            for (index, member) in registry.members().iter().enumerate() {
                println!("{} {} [{}]", index, member.name(), member.canonical_id());
            }
        }
        "migrate" => {
            let target: Encoding = rest.first().context("migrate needs an encoding")?.parse()?;
            *registry = registry.migrate(target)?;
            println!("migrated to {}", target);
        }
        "save" => {
            let path = path.context("no --registry path given")?;
            let bytes = registry.to_bytes()?;
            fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            println!("saved {} entries", registry.len());
        }
        other => bail!("unknown command {:?}", other),
    }

    Ok(())
}

/// Log line for a failed command: the command word and the error, nothing
/// typed after the command
fn diagnostic(line: &str, error: &anyhow::Error) -> String {
    let command = line.split_whitespace().next().unwrap_or_default();
    format!("{}: {:#}", command, error)
}

/// Startup note when `--encoding` loses to a loaded snapshot
fn encoding_override_note(requested: Encoding, loaded: Encoding) -> Option<String> {
    (requested != loaded).then(|| {
        format!(
            "Ignoring --encoding {}: loaded registry uses {}",
            requested, loaded
        )
    })
}

/// Parse hex octets as if a reader had delivered them
fn read_tag(policy: &Policy, words: &[&str]) -> anyhow::Result<IdentityToken> {
    let mut raw = Zeroizing::new(Vec::new());
    let octets = words
        .iter()
        .flat_map(|word| word.split(':'))
        .filter(|octet| !octet.is_empty());
    for (position, octet) in octets.enumerate() {
        raw.push(parse_octet(octet).with_context(|| format!("invalid octet {}", position))?);
    }
    Ok(policy.token_from_reading(&raw, raw.len())?)
}

/// One or two hex digits, no sign
fn parse_octet(octet: &str) -> Option<u8> {
    if octet.is_empty() || octet.len() > 2 || !octet.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(octet, 16).ok()
}

fn load(path: &Path) -> anyhow::Result<Registry> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Registry::from_bytes(&bytes).with_context(|| format!("loading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_omits_tag_bytes() {
        let mut registry = Registry::new(Encoding::UniformHex);
        let policy = Policy::DEFAULT;

        let cases = [
            ("bind 9 de ad be ef", "de ad be ef"),
            ("scan 04:3a:zz", "04:3a"),
            ("enroll Carol 04:3a:+f", "04:3a"),
        ];
        for (line, tag) in cases {
            let error = execute(&mut registry, &policy, line, None).unwrap_err();
            let logged = diagnostic(line, &error);
            let command = line.split_whitespace().next().unwrap();
            assert_eq!(logged, format!("{}: {:#}", command, error));
            assert!(!logged.contains(tag), "tag leaked in {}", logged);
        }
    }

    #[test]
    fn test_diagnostic_on_duplicate_enroll() {
        let mut registry = Registry::new(Encoding::UniformHex);
        let policy = Policy::DEFAULT;
        execute(&mut registry, &policy, "enroll Bob 04 3a ff", None).unwrap();

        let line = "enroll Carol 04:3a:ff";
        let error = execute(&mut registry, &policy, line, None).unwrap_err();
        let logged = diagnostic(line, &error);
        assert!(!logged.contains("3a"));
        assert!(!logged.contains("04-3a-ff"));
    }

    #[test]
    fn test_parse_octet_strict() {
        assert_eq!(parse_octet("0a"), Some(0x0a));
        assert_eq!(parse_octet("a"), Some(0x0a));
        assert_eq!(parse_octet("FF"), Some(0xff));
        assert_eq!(parse_octet("+a"), None);
        assert_eq!(parse_octet("00a"), None);
        assert_eq!(parse_octet("-1"), None);
        assert_eq!(parse_octet(""), None);
    }

    #[test]
    fn test_signed_octet_is_rejected() {
        let mut registry = Registry::new(Encoding::UniformHex);
        assert!(execute(&mut registry, &Policy::DEFAULT, "scan +a", None).is_err());
        assert!(read_tag(&Policy::DEFAULT, &["0a"]).is_ok());
    }

    #[test]
    fn test_enroll_name_is_one_word() {
        let mut registry = Registry::new(Encoding::UniformHex);
        let policy = Policy::DEFAULT;

        let error = execute(&mut registry, &policy, "enroll Front desk 04", None).unwrap_err();
        assert!(format!("{:#}", error).contains("one-word name"));
        assert!(registry.is_empty());

        execute(&mut registry, &policy, "add Front desk", None).unwrap();
        execute(&mut registry, &policy, "bind 0 04", None).unwrap();
        assert_eq!(registry.members()[0].name(), "Front desk");
        assert!(registry.check(&IdentityToken::new(&[4])).is_granted());
    }

    #[test]
    fn test_encoding_override_note() {
        assert_eq!(
            encoding_override_note(Encoding::UniformHex, Encoding::UniformHex),
            None
        );
        let note = encoding_override_note(Encoding::UniformHex, Encoding::LegacyMixed).unwrap();
        assert!(note.contains("hex"));
        assert!(note.contains("legacy-mixed"));
    }
}
