#![allow(dead_code)]

//! Hand-rolled repository fixtures
//!
//! Builds just enough of a real `.git` directory for the binary under test:
//! zlib-compressed loose objects, `MERGE_HEAD`/`ORIG_HEAD`, and a version-2
//! index with conflict-stage entries. No system git required.

use assert_cmd::prelude::CommandCargoExt;
use sha1::{Digest, Sha1};
use std::io::Write;
use std::process::Command;

const AUTHOR: &str = "A <a@example.com> 1714000000 +0000";

pub struct GitFixture {
    dir: assert_fs::TempDir,
}

impl GitFixture {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let dir = assert_fs::TempDir::new()?;
        std::fs::create_dir_all(dir.path().join(".git").join("objects"))?;
        Ok(GitFixture { dir })
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn git_dir(&self) -> std::path::PathBuf {
        self.dir.path().join(".git")
    }

    /// The binary under test, running inside the fixture directory.
    pub fn bin(&self) -> Result<Command, Box<dyn std::error::Error>> {
        let mut command = Command::cargo_bin("mergetrace")?;
        command.current_dir(self.dir.path()).arg("--no-color");
        Ok(command)
    }

    pub fn store_blob(&self, content: &str) -> Result<String, Box<dyn std::error::Error>> {
        self.store_object("blob", content.as_bytes())
    }

    /// Store a flat tree of regular files; entries are sorted by name as git
    /// requires.
    pub fn store_tree(
        &self,
        entries: &[(&str, &str)],
    ) -> Result<String, Box<dyn std::error::Error>> {
        let mut sorted: Vec<_> = entries.to_vec();
        sorted.sort_by_key(|(name, _)| name.to_string());

        let mut body = Vec::new();
        for (name, blob_sha) in sorted {
            body.extend_from_slice(b"100644 ");
            body.extend_from_slice(name.as_bytes());
            body.push(0);
            body.extend_from_slice(&hex_to_bytes(blob_sha));
        }

        self.store_object("tree", &body)
    }

    pub fn store_commit(
        &self,
        tree_sha: &str,
        parents: &[&str],
        message: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let mut body = format!("tree {tree_sha}\n");
        for parent in parents {
            body.push_str(&format!("parent {parent}\n"));
        }
        body.push_str(&format!("author {AUTHOR}\n"));
        body.push_str(&format!("committer {AUTHOR}\n"));
        body.push('\n');
        body.push_str(message);
        body.push('\n');

        self.store_object("commit", body.as_bytes())
    }

    fn store_object(&self, kind: &str, body: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
        let mut content = format!("{kind} {}\0", body.len()).into_bytes();
        content.extend_from_slice(body);

        let mut hasher = Sha1::new();
        hasher.update(&content);
        let sha: String = hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();

        let (prefix, rest) = sha.split_at(2);
        let object_dir = self.git_dir().join("objects").join(prefix);
        std::fs::create_dir_all(&object_dir)?;

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&content)?;
        std::fs::write(object_dir.join(rest), encoder.finish()?)?;

        Ok(sha)
    }

    pub fn write_merge_state(
        &self,
        orig_head: &str,
        merge_heads: &[&str],
    ) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(self.git_dir().join("ORIG_HEAD"), format!("{orig_head}\n"))?;
        std::fs::write(
            self.git_dir().join("MERGE_HEAD"),
            merge_heads
                .iter()
                .map(|head| format!("{head}\n"))
                .collect::<String>(),
        )?;
        Ok(())
    }

    /// Write a version-2 index holding stage 1/2/3 entries for each path.
    pub fn write_conflict_index(&self, paths: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
        let mut entries: Vec<(&str, u16)> = paths
            .iter()
            .flat_map(|path| [1u16, 2, 3].map(|stage| (*path, stage)))
            .collect();
        entries.sort();

        let mut content = Vec::new();
        content.extend_from_slice(b"DIRC");
        content.extend_from_slice(&2u32.to_be_bytes());
        content.extend_from_slice(&(entries.len() as u32).to_be_bytes());

        for (path, stage) in entries {
            let entry_start = content.len();

            // stat metadata (ctime, mtime, dev, ino) is irrelevant here
            for _ in 0..6 {
                content.extend_from_slice(&0u32.to_be_bytes());
            }
            content.extend_from_slice(&0o100644u32.to_be_bytes());
            // uid, gid, size
            for _ in 0..3 {
                content.extend_from_slice(&0u32.to_be_bytes());
            }
            content.extend_from_slice(&[0u8; 20]);

            let flags = (stage << 12) | (path.len().min(0xfff) as u16);
            content.extend_from_slice(&flags.to_be_bytes());
            content.extend_from_slice(path.as_bytes());
            content.push(0);

            while (content.len() - entry_start) % 8 != 0 {
                content.push(0);
            }
        }

        let mut hasher = Sha1::new();
        hasher.update(&content);
        let digest = hasher.finalize();
        content.extend_from_slice(&digest);

        std::fs::write(self.git_dir().join("index"), content)?;
        Ok(())
    }
}

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let high = (pair[0] as char).to_digit(16).unwrap_or(0) as u8;
            let low = (pair[1] as char).to_digit(16).unwrap_or(0) as u8;
            (high << 4) | low
        })
        .collect()
}
