use std::collections::HashMap;

use chrono::Local;
use fileshare_core::{StoreEvent, TaskId, TaskStatus, UploadTask};
use fileshare_engine::FileEntry;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const PROGRESS_STEP: u8 = 25;

/// Human readable size with up to two decimals, e.g. `1.5 KB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

pub fn format_listing(entries: &[FileEntry]) -> String {
    if entries.is_empty() {
        return "No files on the server".to_string();
    }
    let width = entries
        .iter()
        .map(|entry| entry.name.chars().count())
        .max()
        .unwrap_or(0);
    entries
        .iter()
        .map(|entry| {
            let size = if entry.is_dir {
                "<dir>".to_string()
            } else {
                format_size(entry.size)
            };
            format!(
                "{name:<width$}  {size:>10}  {modified}",
                name = entry.name,
                size = size,
                modified = entry
                    .modified_time
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns store events into progress lines. Progress is printed in steps so
/// streamed uploads do not flood the terminal.
#[derive(Debug, Default)]
pub struct ProgressRenderer {
    last_seen: HashMap<TaskId, (TaskStatus, u8)>,
}

impl ProgressRenderer {
    pub fn apply(&mut self, event: StoreEvent) -> Vec<String> {
        match event {
            StoreEvent::Created(tasks) => {
                let mut lines = vec![format!("Queued {} file(s)", tasks.len())];
                for task in tasks {
                    lines.push(task_line(&task));
                    self.last_seen.insert(task.id, (task.status, task.progress));
                }
                lines
            }
            StoreEvent::Updated(task) => {
                let previous = self.last_seen.insert(task.id, (task.status, task.progress));
                let show = match previous {
                    Some((status, _)) if status != task.status => true,
                    Some((_, progress)) => {
                        task.progress / PROGRESS_STEP > progress / PROGRESS_STEP
                    }
                    None => true,
                };
                if show {
                    vec![task_line(&task)]
                } else {
                    Vec::new()
                }
            }
            StoreEvent::Cleared => {
                self.last_seen.clear();
                Vec::new()
            }
        }
    }
}

fn task_line(task: &UploadTask) -> String {
    let state = match task.status {
        TaskStatus::Pending => "pending".to_string(),
        TaskStatus::Uploading => format!("uploading {:>3}%", task.progress),
        TaskStatus::Completed => "done".to_string(),
        TaskStatus::Error => "FAILED".to_string(),
    };
    format!("[#{id}] {name} {state}", id = task.id, name = task.name)
}
