use crate::constants::MAX_COMMAND_LEN;

/// Инкрементальный разбор входящего потока на команды.
///
/// Чанк может содержать ноль, одну или несколько строк, а хвост без `\n`
/// остаётся в буфере до следующего чтения.
#[derive(Debug)]
pub struct LineBuffer {
    pending: Vec<u8>,
    limit: usize,
    /// выбрасываем байты до ближайшего `\n` после переполнения
    skipping: bool,
    discarded: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(MAX_COMMAND_LEN)
    }
}

impl LineBuffer {
    /// `limit` - максимальная длина незавершённой строки
    pub fn new(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            limit,
            skipping: false,
            discarded: 0,
        }
    }

    /// Добавить чанк и вернуть все команды, которые он завершил, по порядку
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut chunk = chunk;

        if self.skipping {
            match chunk.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    self.discarded += pos + 1;
                    chunk = &chunk[pos + 1..];
                    self.skipping = false;
                }
                None => {
                    self.discarded += chunk.len();
                    return Vec::new();
                }
            }
        }

        self.pending.extend_from_slice(chunk);

        let mut commands = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            commands.push(normalize_segment(&self.pending[start..end]));
            start = end + 1;
        }
        self.pending.drain(..start);

        if self.pending.len() > self.limit {
            self.discarded += self.pending.len();
            self.pending.clear();
            self.skipping = true;
        }

        commands
    }

    /// Незавершённый хвост
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Сколько байт выброшено из-за слишком длинных строк
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

/// Пустая строка тоже команда: её надо записать в журнал
fn normalize_segment(seg: &[u8]) -> String {
    let start = seg
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(seg.len());
    String::from_utf8_lossy(&seg[start..]).into_owned()
}
