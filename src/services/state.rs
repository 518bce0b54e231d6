use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use tokio::runtime::Handle;
use tracing::{error, info, warn};

use crate::db::Database;
use crate::models::{ImportReport, Settings};
use crate::services::api::{ItemApi, ItemsApiClient};
use crate::services::processor::process_inbox_file;
use crate::services::spreadsheet::is_supported;
use crate::services::watcher::{debounce_file_event, FileEvent, WatcherService, DEBOUNCE_MS};

pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub settings: Arc<Mutex<Settings>>,
    watcher: Mutex<Option<WatcherService>>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        AppState {
            db: Arc::new(Mutex::new(db)),
            settings: Arc::new(Mutex::new(settings)),
            watcher: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(self.settings.lock().map_err(|_| anyhow!("Settings lock"))?.clone())
    }

    pub fn update_settings(&self, settings: Settings) -> Result<()> {
        let mut locked = self.settings.lock().map_err(|_| anyhow!("Settings lock"))?;
        *locked = settings;
        Ok(())
    }

    pub fn api_client(&self) -> Result<ItemsApiClient> {
        ItemsApiClient::from_settings(&self.settings()?)
    }

    fn inbox(&self) -> Result<PathBuf> {
        self.settings()?
            .inbox_folder
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("Inbox folder not configured"))
    }

    /// Imports every supported file directly inside the inbox, one after another.
    pub async fn scan_inbox<A: ItemApi + ?Sized>(&self, api: &A) -> Result<Vec<ImportReport>> {
        let inbox = self.inbox()?;
        scan_folder(&self.db, &inbox, api).await
    }

    /// Starts watching the inbox. Events are handled on a dedicated thread, one import at a time.
    pub fn watch_inbox(&self, runtime: Handle) -> Result<()> {
        let mut guard = self.watcher.lock().map_err(|_| anyhow!("Watcher lock"))?;
        *guard = None;

        let inbox = self.inbox()?;
        let (tx, rx) = mpsc::channel();
        *guard = Some(WatcherService::start(&inbox, tx)?);
        info!(inbox = %inbox.display(), "Watching inbox");

        let db = self.db.clone();
        let settings = self.settings.clone();
        std::thread::spawn(move || {
            for event in rx {
                handle_event(event, &db, &settings, &runtime);
            }
        });

        Ok(())
    }
}

pub async fn scan_folder<A: ItemApi + ?Sized>(
    db: &Arc<Mutex<Database>>,
    folder: &Path,
    api: &A,
) -> Result<Vec<ImportReport>> {
    let mut entries = walkdir::WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| is_supported(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect::<Vec<_>>();
    entries.sort();

    let mut reports = Vec::new();
    for path in entries {
        if let Some(report) = import_inbox_file(db, &path, api).await {
            reports.push(report);
        }
    }
    Ok(reports)
}

/// Imports one inbox file unless its content already has a run. Errors are logged, not returned.
pub async fn import_inbox_file<A: ItemApi + ?Sized>(
    db: &Arc<Mutex<Database>>,
    path: &Path,
    api: &A,
) -> Option<ImportReport> {
    match process_inbox_file(db, path, api, |_, _| {}).await {
        Ok(Some(report)) => {
            info!(
                file = %path.display(),
                status = %report.run.status,
                message = report.run.message.as_deref().unwrap_or(""),
                "Inbox file processed"
            );
            Some(report)
        }
        Ok(None) => None,
        Err(err) => {
            error!(file = %path.display(), error = %err, "Inbox file failed");
            None
        }
    }
}

fn handle_event(event: FileEvent, db: &Arc<Mutex<Database>>, settings: &Arc<Mutex<Settings>>, runtime: &Handle) {
    if !debounce_file_event(&event.path, DEBOUNCE_MS) {
        return;
    }

    let client = match settings.lock() {
        Ok(guard) => ItemsApiClient::from_settings(&guard),
        Err(_) => Err(anyhow!("Settings lock")),
    };
    let client = match client {
        Ok(client) => client,
        Err(err) => {
            warn!(file = %event.path.display(), error = %err, "Cannot import inbox file");
            return;
        }
    };

    info!(file = %event.path.display(), kind = ?event.kind, "Inbox file changed");
    runtime.block_on(import_inbox_file(db, &event.path, &client));
}
