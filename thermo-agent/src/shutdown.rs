use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::{debug, info, warn};

use crate::config::BUTTON_POLL;

/// Флаги остановки, общие для цикла сессии и внешних триггеров
/// (Ctrl-C, кнопка).
///
/// Триггеры только выставляют `requested`. Саму последовательность
/// (SHUTDOWN, закрытие журнала и транспорта) выполняет цикл сессии,
/// и ровно один раз: это гарантирует `try_begin`.
#[derive(Debug, Default)]
pub(crate) struct ShutdownLatch {
    requested: AtomicBool,
    started: AtomicBool,
}

impl ShutdownLatch {
    pub(crate) fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// `true` только у первого вызывающего
    pub(crate) fn try_begin(&self) -> bool {
        self.request();
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Ctrl+C / SIGTERM => запрос остановки
pub(crate) fn install_ctrlc(latch: Arc<ShutdownLatch>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        info!("interrupt received, shutting down...");
        latch.request();
    })
}

/// Детектор переднего фронта 0 -> 1. Первый отсчёт только запоминается,
/// так что кнопка, зажатая на старте, остановку не вызывает.
#[derive(Debug, Default)]
pub(crate) struct RisingEdge {
    prev: Option<bool>,
}

impl RisingEdge {
    pub(crate) fn update(&mut self, level: bool) -> bool {
        let fired = self.prev == Some(false) && level;
        self.prev = Some(level);
        fired
    }
}

/// Фоновый опрос файла значения GPIO (sysfs `.../gpioN/value`)
pub(crate) fn spawn_button_watcher(
    path: PathBuf,
    latch: Arc<ShutdownLatch>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("button-watcher".into())
        .spawn(move || watch_button(&path, &latch))
}

fn watch_button(path: &Path, latch: &ShutdownLatch) {
    let mut edge = RisingEdge::default();

    while !latch.is_requested() {
        match read_level(path) {
            Ok(level) => {
                if edge.update(level) {
                    info!("button pressed, shutting down...");
                    latch.request();
                    break;
                }
            }
            Err(e) => {
                warn!("button watcher stopped: cannot read {:?}: {e}", path);
                return;
            }
        }
        thread::sleep(BUTTON_POLL);
    }

    debug!("button watcher finished");
}

fn read_level(path: &Path) -> io::Result<bool> {
    let text = fs::read_to_string(path)?;
    Ok(text.trim() == "1")
}
