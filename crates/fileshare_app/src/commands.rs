use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use anyhow::{anyhow, bail};
use fileshare_core::{NoticeKind, SelectionSet};
use fileshare_engine::{EngineCommand, EngineEvent, EngineHandle, FileEntry, UploadFile};
use fileshare_logging::{share_debug, share_info};

use crate::render::{format_listing, ProgressRenderer};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Prints the server listing. Returns whether the command fully succeeded.
pub fn list(engine: &EngineHandle) -> anyhow::Result<bool> {
    let entries = fetch_listing(engine)?;
    println!("{}", format_listing(&entries));
    Ok(true)
}

pub fn upload(engine: &EngineHandle, paths: Vec<PathBuf>) -> anyhow::Result<bool> {
    let files: Vec<UploadFile> = paths.into_iter().map(UploadFile::from_path).collect();
    share_info!(
        "starting upload of {} file(s), {} at a time",
        files.len(),
        engine.profile().concurrency_limit()
    );

    let store_events = engine.store().subscribe();
    let mut renderer = ProgressRenderer::default();
    engine.send(EngineCommand::Upload { files });

    loop {
        let event = next_event(engine);
        for store_event in store_events.try_iter() {
            for line in renderer.apply(store_event) {
                println!("{line}");
            }
        }
        match event? {
            Some(EngineEvent::UploadFinished(summary)) => {
                let notice = summary.notice();
                println!("{notice}");
                return Ok(notice.kind == NoticeKind::Success);
            }
            Some(other) => share_debug!("ignoring {:?} during upload", other),
            None => {}
        }
    }
}

pub fn download(
    engine: &EngineHandle,
    names: Vec<String>,
    all: bool,
    zip: bool,
    dir: PathBuf,
) -> anyhow::Result<bool> {
    let mut selection = select(engine, names, all)?;
    if selection.is_empty() {
        println!("Nothing to download");
        return Ok(true);
    }

    let names = selection.names();
    let expected = if zip { 1 } else { names.len() };
    let command = if zip {
        EngineCommand::DownloadArchive { names, dir }
    } else {
        EngineCommand::Download { names, dir }
    };
    engine.send(command);

    let mut all_ok = true;
    let mut received = 0;
    while received < expected {
        match next_event(engine)? {
            Some(EngineEvent::Downloaded { name, result }) => {
                received += 1;
                match result {
                    Ok(path) => println!("Saved {} to {}", name, path.display()),
                    Err(err) => {
                        all_ok = false;
                        println!("Download of {name} failed: {err}");
                    }
                }
            }
            Some(other) => share_debug!("ignoring {:?} during download", other),
            None => {}
        }
    }
    selection.clear();
    Ok(all_ok)
}

pub fn delete(engine: &EngineHandle, names: Vec<String>, all: bool) -> anyhow::Result<bool> {
    let mut selection = select(engine, names, all)?;
    if selection.is_empty() {
        println!("Nothing to delete");
        return Ok(true);
    }

    let names = selection.names();
    let expected = names.len();
    engine.send(EngineCommand::Delete { names });

    let mut deleted = 0;
    let mut received = 0;
    while received < expected {
        match next_event(engine)? {
            Some(EngineEvent::Deleted { name, result }) => {
                received += 1;
                match result {
                    Ok(()) => {
                        deleted += 1;
                        println!("Deleted {name}");
                    }
                    Err(err) => println!("Delete of {name} failed: {err}"),
                }
            }
            Some(other) => share_debug!("ignoring {:?} during delete", other),
            None => {}
        }
    }
    selection.clear();
    println!("{deleted} of {expected} file(s) deleted");
    Ok(deleted == expected)
}

/// Builds the bulk-action selection: every listed file for `all`, otherwise
/// the named files with duplicates collapsed.
fn select(engine: &EngineHandle, names: Vec<String>, all: bool) -> anyhow::Result<SelectionSet> {
    let mut selection = SelectionSet::new();
    if all {
        let entries = fetch_listing(engine)?;
        selection.select_all(
            entries
                .into_iter()
                .filter(|entry| !entry.is_dir)
                .map(|entry| entry.name),
        );
    } else {
        for name in names {
            if !selection.contains(&name) {
                selection.toggle(&name);
            }
        }
    }
    share_debug!("{} file(s) selected", selection.size());
    Ok(selection)
}

fn fetch_listing(engine: &EngineHandle) -> anyhow::Result<Vec<FileEntry>> {
    engine.send(EngineCommand::List);
    loop {
        match next_event(engine)? {
            Some(EngineEvent::Listed(result)) => {
                return result.map_err(|err| anyhow!("listing files failed: {err}"));
            }
            Some(other) => share_debug!("ignoring {:?} while listing", other),
            None => {}
        }
    }
}

fn next_event(engine: &EngineHandle) -> anyhow::Result<Option<EngineEvent>> {
    match engine.recv_timeout(POLL_INTERVAL) {
        Ok(event) => Ok(Some(event)),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => bail!("the engine stopped unexpectedly"),
    }
}
