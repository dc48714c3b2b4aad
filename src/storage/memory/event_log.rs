//! Append-only event log
//!
//! 每行一个 JSON 对象，记录内存存储的一次成功修改。文件只追加、只向前回放，
//! 从不改写。写入发生在内存修改成功之后，日志是确认日志而不是预写日志。

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{LinkvaultError, Result};
use crate::storage::models::UrlRecord;

/// 日志中的一条事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "uuid", with = "sequence_as_string")]
    pub sequence: u64,
    pub short_url: String,
    pub original_url: String,
    #[serde(rename = "user_uuid")]
    pub owner_id: String,
    #[serde(rename = "is_deleted", default)]
    pub deleted: bool,
}

impl EventRecord {
    pub fn from_record(sequence: u64, record: &UrlRecord) -> Self {
        Self {
            sequence,
            short_url: record.short_id.clone(),
            original_url: record.original_url.clone(),
            owner_id: record.owner_id.clone(),
            deleted: record.deleted,
        }
    }

    pub fn into_record(self) -> UrlRecord {
        UrlRecord {
            short_id: self.short_url,
            original_url: self.original_url,
            owner_id: self.owner_id,
            deleted: self.deleted,
        }
    }
}

/// `uuid` 字段在文件中是字符串形式的序号
mod sequence_as_string {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(sequence: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(sequence)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text
                .trim()
                .parse()
                .map_err(|e| de::Error::custom(format!("invalid sequence {:?}: {}", text, e))),
            Raw::Number(n) => Ok(n),
        }
    }
}

/// 事件日志写入端
///
/// 启动时以追加模式打开一次，关闭时 fsync。序号只在单写者下使用，
/// 调用方负责串行化（内存存储把它放在同一把锁里）。
pub struct EventLog {
    path: PathBuf,
    writer: Box<dyn Write + Send>,
    sequence: u64,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("path", &self.path)
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl EventLog {
    /// 打开（必要时创建）日志文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                LinkvaultError::file_operation(format!(
                    "无法创建事件日志目录 {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LinkvaultError::file_operation(format!(
                    "无法打开事件日志 {}: {}",
                    path.display(),
                    e
                ))
            })?;

        // 上次崩溃可能留下没有换行的半行，先补齐，新事件才能独占一行
        if ends_with_partial_line(&mut file)? {
            warn!(
                "Event log {} ends with a partial line, terminating it",
                path.display()
            );
            file.write_all(b"\n").map_err(|e| {
                LinkvaultError::file_operation(format!(
                    "无法修复事件日志 {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        debug!("Event log opened at {}", path.display());
        Ok(Self::with_writer(path, file))
    }

    /// 使用任意写入端构造（测试中用于注入写入失败）
    pub fn with_writer(path: impl Into<PathBuf>, writer: impl Write + Send + 'static) -> Self {
        Self {
            path: path.into(),
            writer: Box::new(writer),
            sequence: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 递增并返回下一个序号
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    pub fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    /// 追加一条事件
    pub fn append(&mut self, event: &EventRecord) -> Result<()> {
        self.append_all(std::slice::from_ref(event))
    }

    /// 以一次写入追加多条事件
    pub fn append_all(&mut self, events: &[EventRecord]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::with_capacity(events.len() * 128);
        for event in events {
            serde_json::to_writer(&mut buf, event)?;
            buf.push(b'\n');
        }

        self.writer
            .write_all(&buf)
            .and_then(|_| self.writer.flush())
            .map_err(|e| {
                LinkvaultError::file_operation(format!(
                    "写入事件日志 {} 失败: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    /// 刷新缓冲并让内核落盘
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        // 写入端可能不是文件，单独打开一次做 fsync
        if self.path.exists() {
            File::open(&self.path)?.sync_all()?;
        }
        Ok(())
    }
}

fn ends_with_partial_line(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// 逐行读取事件日志
///
/// 按字节读取，空行被跳过；IO 错误产出 `FileOperation`，
/// 非 UTF-8 或解析失败的行产出 `Serialization`。
pub struct EventReader {
    reader: Option<BufReader<File>>,
    buf: Vec<u8>,
    line_no: usize,
}

impl Iterator for EventReader {
    /// (行号, 解析结果)
    type Item = (usize, Result<EventRecord>);

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        loop {
            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    self.line_no += 1;
                    // 读失败后不再继续，避免同一错误无限重复
                    self.reader = None;
                    return Some((self.line_no, Err(e.into())));
                }
            }
            self.line_no += 1;

            if self.buf.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            return Some((self.line_no, parse_line(&self.buf)));
        }
    }
}

fn parse_line(bytes: &[u8]) -> Result<EventRecord> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LinkvaultError::serialization(format!("非 UTF-8 日志行: {}", e)))?;
    Ok(serde_json::from_str::<EventRecord>(text.trim())?)
}

/// 打开日志用于回放；文件不存在时返回空迭代器
pub fn read_events(path: impl AsRef<Path>) -> Result<EventReader> {
    let path = path.as_ref();
    let reader = match File::open(path) {
        Ok(file) => Some(BufReader::new(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(LinkvaultError::file_operation(format!(
                "无法读取事件日志 {}: {}",
                path.display(),
                e
            )));
        }
    };

    Ok(EventReader {
        reader,
        buf: Vec::new(),
        line_no: 0,
    })
}
