use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use super::{Transport, TransportError, take_buffered};

/// Шаг сценария входящих данных
#[derive(Debug)]
pub(crate) enum Step {
    /// Чанк, доступный на этом тике
    Chunk(Vec<u8>),
    /// Тик без входящих данных
    Idle,
    /// Ошибка чтения
    Fail,
}

/// Транспорт для тестов сессии: отдаёт входящие по сценарию, копит
/// отправленное. Когда сценарий кончился, считается, что пир отвалился,
/// чтобы тест не висел.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    script: VecDeque<Step>,
    pending: Vec<u8>,
    pub(crate) sent: Vec<String>,
    pub(crate) close_calls: usize,
    pub(crate) sends_after_close: usize,
    closed: bool,
}

impl ScriptedTransport {
    pub(crate) fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}

pub(crate) fn chunk(s: &str) -> Step {
    Step::Chunk(s.as_bytes().to_vec())
}

impl Transport for ScriptedTransport {
    fn send(&mut self, line: &str) -> Result<(), TransportError> {
        if self.closed {
            self.sends_after_close += 1;
            return Err(TransportError::Closed);
        }
        self.sent.push(line.to_string());
        Ok(())
    }

    fn poll_readable(&mut self, timeout: Duration) -> Result<bool, TransportError> {
        if !self.pending.is_empty() {
            return Ok(true);
        }

        match self.script.pop_front() {
            Some(Step::Chunk(bytes)) => {
                self.pending = bytes;
                Ok(true)
            }
            Some(Step::Idle) => {
                thread::sleep(timeout);
                Ok(false)
            }
            Some(Step::Fail) => Err(TransportError::Io(std::io::Error::other("scripted failure"))),
            None => Err(TransportError::PeerClosed),
        }
    }

    fn read_available(&mut self, max_bytes: usize) -> Result<Vec<u8>, TransportError> {
        Ok(take_buffered(&mut self.pending, max_bytes))
    }

    fn close(&mut self) {
        self.close_calls += 1;
        self.closed = true;
    }
}
