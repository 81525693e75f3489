//! argument parsing and output formatting over `libbit`; no object-model
//! logic lives here (spec.md §1, §6 CLI surface)

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use libbit::obj::{ObjKind, Object};
use libbit::{BitResult, Oid, Repository};
use owo_colors::OwoColorize;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bit", author, about = "a minimal, git-compatible version control system")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// create an empty repository
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// show information about an object
    CatFile {
        #[arg(short = 't', group = "op")]
        show_type: bool,
        #[arg(short = 's', group = "op")]
        show_size: bool,
        #[arg(short = 'p', group = "op")]
        pretty_print: bool,
        #[arg(short = 'e', group = "op")]
        exists: bool,
        object: String,
    },
    /// compute (and optionally store) the object id for a file
    HashObject {
        #[arg(short = 'w')]
        write: bool,
        #[arg(short = 't', long = "type", default_value = "blob")]
        kind: String,
        path: PathBuf,
    },
    /// print the commit graph reachable from a revision
    Log {
        #[arg(default_value = "HEAD")]
        revision: String,
    },
    /// list the contents of a tree object
    LsTree {
        revision: String,
    },
    /// materialize a commit or tree into a directory
    Checkout {
        revision: String,
        path: PathBuf,
    },
    /// list every ref and what it resolves to
    ShowRef,
    /// create a tag
    Tag {
        #[arg(short = 'a')]
        annotate: bool,
        #[arg(short = 'm')]
        message: Option<String>,
        name: String,
        #[arg(default_value = "HEAD")]
        target: String,
    },
    /// resolve a revision to an object id
    RevParse {
        revision: String,
    },
    /// stage files
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// record staged changes as a new commit
    Commit {
        #[arg(short = 'm')]
        message: String,
    },
    /// list the files currently staged
    LsFiles,
}

pub fn run<T: Into<OsString> + Clone>(args: impl IntoIterator<Item = T>) -> BitResult<()> {
    let cli = Cli::parse_from(args);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Init { path } => cmd_init(path),
        Command::CatFile { show_type, show_size, pretty_print, exists, object } =>
            cmd_cat_file(&mut out, show_type, show_size, pretty_print, exists, &object),
        Command::HashObject { write, kind, path } => cmd_hash_object(&mut out, write, &kind, &path),
        Command::Log { revision } => cmd_log(&mut out, &revision),
        Command::LsTree { revision } => cmd_ls_tree(&mut out, &revision),
        Command::Checkout { revision, path } => cmd_checkout(&revision, &path),
        Command::ShowRef => cmd_show_ref(&mut out),
        Command::Tag { annotate, message, name, target } => cmd_tag(annotate, message, &name, &target),
        Command::RevParse { revision } => cmd_rev_parse(&mut out, &revision),
        Command::Add { paths } => cmd_add(paths),
        Command::Commit { message } => cmd_commit(&mut out, message),
        Command::LsFiles => cmd_ls_files(&mut out),
    }
}

fn cmd_init(path: PathBuf) -> BitResult<()> {
    let repo = Repository::init(&path)?;
    println!("initialized empty bit repository in `{}`", repo.gitdir().display());
    Ok(())
}

fn cmd_cat_file(
    out: &mut impl Write,
    show_type: bool,
    show_size: bool,
    pretty_print: bool,
    exists: bool,
    object: &str,
) -> BitResult<()> {
    let repo = Repository::find(".")?;
    let oid = repo.resolve(object)?;
    if exists {
        repo.read_object(oid)?;
        return Ok(());
    }
    let obj = repo.read_object(oid)?;
    if show_type {
        writeln!(out, "{}", obj.kind())?;
    } else if show_size {
        writeln!(out, "{}", obj.serialize().len())?;
    } else if pretty_print {
        print_object(out, &obj)?;
    } else {
        bail!("one of -t, -s, -p or -e must be given");
    }
    Ok(())
}

fn print_object(out: &mut impl Write, obj: &Object) -> BitResult<()> {
    match obj {
        Object::Blob(blob) => out.write_all(blob.bytes())?,
        Object::Tree(tree) =>
            for entry in &tree.entries {
                writeln!(out, "{} {} {}\t{}", entry.mode, tree_entry_kind(entry), entry.oid, String::from_utf8_lossy(&entry.name))?;
            },
        Object::Commit(commit) => {
            writeln!(out, "tree {}", commit.tree)?;
            for parent in &commit.parents {
                writeln!(out, "parent {}", parent)?;
            }
            writeln!(out, "author {}", commit.author)?;
            writeln!(out, "committer {}", commit.committer)?;
            writeln!(out)?;
            out.write_all(&commit.message)?;
        }
        Object::Tag(tag) => {
            writeln!(out, "object {}", tag.object)?;
            writeln!(out, "type {}", tag.obj_kind)?;
            writeln!(out, "tag {}", tag.tag)?;
            writeln!(out, "tagger {}", tag.tagger)?;
            writeln!(out)?;
            out.write_all(&tag.message)?;
        }
    }
    Ok(())
}

fn tree_entry_kind(entry: &libbit::obj::TreeEntry) -> &'static str {
    if entry.mode.is_tree() { "tree" } else { "blob" }
}

fn cmd_hash_object(out: &mut impl Write, write: bool, kind: &str, path: &std::path::Path) -> BitResult<()> {
    let kind = ObjKind::from_bytes(kind.as_bytes())?;
    let bytes = std::fs::read(path).with_context(|| format!("reading `{}`", path.display()))?;
    let obj = Object::deserialize(kind, &bytes)?;
    let oid = if write {
        let repo = Repository::find(".")?;
        repo.write_object(&obj)?
    } else {
        libbit::obj::hash_object(kind, &obj.serialize())
    };
    writeln!(out, "{}", oid)?;
    Ok(())
}

fn cmd_log(out: &mut impl Write, revision: &str) -> BitResult<()> {
    let repo = Repository::find(".")?;
    let start = repo.resolve_as(revision, ObjKind::Commit, true)?;
    print_commit(out, &repo, start)?;
    let mut printed = std::collections::HashSet::new();
    printed.insert(start);
    for (_, parent) in repo.log(start)? {
        if printed.insert(parent) {
            print_commit(out, &repo, parent)?;
        }
    }
    Ok(())
}

fn print_commit(out: &mut impl Write, repo: &Repository, oid: Oid) -> BitResult<()> {
    let commit = repo.read_object(oid)?.into_commit()?;
    writeln!(out, "{} {}", "commit".yellow(), oid.to_string().yellow())?;
    writeln!(out, "Author: {} <{}>", commit.author.name, commit.author.email)?;
    writeln!(out, "Date:   {}", commit.author.time)?;
    writeln!(out)?;
    for line in String::from_utf8_lossy(&commit.message).lines() {
        writeln!(out, "    {}", line)?;
    }
    writeln!(out)?;
    Ok(())
}

fn cmd_ls_tree(out: &mut impl Write, revision: &str) -> BitResult<()> {
    let repo = Repository::find(".")?;
    let oid = repo.resolve_as(revision, ObjKind::Tree, true)?;
    let tree = repo.read_object(oid)?.into_tree()?;
    for entry in tree.entries {
        writeln!(
            out,
            "{} {} {}\t{}",
            entry.mode,
            if entry.mode.is_tree() { "tree" } else { "blob" },
            entry.oid,
            String::from_utf8_lossy(&entry.name)
        )?;
    }
    Ok(())
}

fn cmd_checkout(revision: &str, path: &std::path::Path) -> BitResult<()> {
    let repo = Repository::find(".")?;
    let oid = repo.resolve(revision)?;
    repo.checkout(oid, path)
}

fn cmd_show_ref(out: &mut impl Write) -> BitResult<()> {
    let repo = Repository::find(".")?;
    for root in ["refs/heads", "refs/tags"] {
        for (name, oid) in repo.refs().list(root)? {
            writeln!(out, "{} {}", oid, name)?;
        }
    }
    Ok(())
}

fn cmd_tag(annotate: bool, message: Option<String>, name: &str, target: &str) -> BitResult<()> {
    let repo = Repository::find(".")?;
    let target_oid = repo.resolve(target)?;
    if annotate {
        let target_kind = repo.read_object(target_oid)?.kind();
        let tagger = repo.signature()?;
        let message = message.unwrap_or_default();
        repo.tag_annotated(name, target_oid, target_kind, tagger, message)?;
    } else {
        repo.tag_lightweight(name, target_oid)?;
    }
    Ok(())
}

fn cmd_rev_parse(out: &mut impl Write, revision: &str) -> BitResult<()> {
    let repo = Repository::find(".")?;
    writeln!(out, "{}", repo.resolve(revision)?)?;
    Ok(())
}

fn cmd_add(paths: Vec<PathBuf>) -> BitResult<()> {
    let repo = Repository::find(".")?;
    repo.add(&paths)
}

fn cmd_commit(out: &mut impl Write, message: String) -> BitResult<()> {
    let repo = Repository::find(".")?;
    let oid = repo.commit(message)?;
    writeln!(out, "committed {}", oid)?;
    Ok(())
}

fn cmd_ls_files(out: &mut impl Write) -> BitResult<()> {
    let repo = Repository::find(".")?;
    let index = repo.index()?;
    for entry in index.entries() {
        writeln!(out, "{}", String::from_utf8_lossy(&entry.path))?;
    }
    Ok(())
}
