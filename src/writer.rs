/*!
 * Size-bounded multi-part report writer
 *
 * A scan report is a sequence of numbered parts. Blocks are appended to the
 * open part until the next block would push it past the split threshold
 * (`max_part_size - safety_margin`); the part is then closed with a
 * continuation trailer and a fresh part is opened before the block is
 * written. Room for the trailer that will close the part is reserved in that
 * check. Blocks are never split. A block that cannot fit together with a
 * header and a trailer is written whole into the part that is open when it
 * arrives, provided that part holds no block yet, so an oversized part
 * contains exactly one block.
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{ReportError, Result};
use crate::types::ContentBlock;
use crate::utils::format_file_size;

/// Default ceiling for one report part (185 MiB)
pub const MAX_PART_SIZE: u64 = 185 * 1024 * 1024;

/// Default headroom kept below the ceiling when deciding to split (50 KiB)
pub const SAFETY_MARGIN: u64 = 50 * 1024;

const RULE: &str = "-------------------------------------------------------------------";

/// Byte budget for report parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartLimits {
    pub max_part_size: u64,
    pub safety_margin: u64,
}

impl Default for PartLimits {
    fn default() -> Self {
        Self {
            max_part_size: MAX_PART_SIZE,
            safety_margin: SAFETY_MARGIN,
        }
    }
}

impl PartLimits {
    /// Offset past which a new block forces a split
    pub fn threshold(&self) -> u64 {
        self.max_part_size.saturating_sub(self.safety_margin)
    }
}

/// Run-wide values repeated in every part header
#[derive(Debug, Clone)]
pub struct PartHeader {
    /// Scan root as given on the command line
    pub root: String,
    /// Generation time, fixed once per run
    pub generated_at: String,
}

impl PartHeader {
    fn render(&self, number: usize, limits: &PartLimits) -> String {
        format!(
            "--- Folder Scan Report (Part {}): {} ---\n\
             Generated at: {}\n\
             Max size per part: {}.\n\
             {}\n\n",
            number,
            self.root,
            self.generated_at,
            format_file_size(limits.max_part_size),
            RULE
        )
    }
}

/// Factory and sink for report part resources
pub trait PartStore {
    /// Writable handle of one open part
    type Part: Write;

    /// Open part `number` (1-based)
    fn open(&mut self, number: usize) -> Result<Self::Part>;

    /// Flush and release part `number`
    fn close(&mut self, number: usize, part: Self::Part) -> Result<()>;

    /// Human-readable location of part `number`
    fn describe(&self, number: usize) -> String;
}

/// Writes parts as `<dir>/<stem>-part<N>.txt`
#[derive(Debug, Clone)]
pub struct FilePartStore {
    dir: PathBuf,
    stem: String,
}

impl FilePartStore {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// Path of part `number`
    pub fn part_path(&self, number: usize) -> PathBuf {
        self.dir.join(format!("{}-part{}.txt", self.stem, number))
    }
}

impl PartStore for FilePartStore {
    type Part = BufWriter<File>;

    fn open(&mut self, number: usize) -> Result<Self::Part> {
        let path = self.part_path(number);
        let file = File::create(&path).map_err(|e| ReportError::output(&path, e))?;
        info!(path = %path.display(), "opened report part");
        Ok(BufWriter::new(file))
    }

    fn close(&mut self, number: usize, mut part: Self::Part) -> Result<()> {
        let path = self.part_path(number);
        part.flush().map_err(|e| ReportError::output(&path, e))?;
        let file = part
            .into_inner()
            .map_err(|e| ReportError::output(&path, e.into_error()))?;
        file.sync_all().map_err(|e| ReportError::output(&path, e))?;
        info!(path = %path.display(), "closed report part");
        Ok(())
    }

    fn describe(&self, number: usize) -> String {
        self.part_path(number).display().to_string()
    }
}

/// Keeps closed parts in memory
#[derive(Debug, Default)]
pub struct MemoryPartStore {
    parts: Vec<Vec<u8>>,
}

impl MemoryPartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed parts in order, part 1 first
    pub fn parts(&self) -> &[Vec<u8>] {
        &self.parts
    }

    /// Closed parts as text
    pub fn texts(&self) -> Vec<String> {
        self.parts
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }
}

impl PartStore for MemoryPartStore {
    type Part = Vec<u8>;

    fn open(&mut self, _number: usize) -> Result<Self::Part> {
        Ok(Vec::new())
    }

    fn close(&mut self, _number: usize, part: Self::Part) -> Result<()> {
        self.parts.push(part);
        Ok(())
    }

    fn describe(&self, number: usize) -> String {
        format!("memory part {}", number)
    }
}

/// Outcome for one finished part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSummary {
    pub number: usize,
    pub location: String,
    /// Bytes written, including header and trailers
    pub bytes: u64,
    pub blocks: usize,
}

struct OpenPart<P> {
    number: usize,
    handle: P,
    offset: u64,
    blocks: usize,
}

/// Stateful writer that owns the single open report part
pub struct PartWriter<S: PartStore> {
    store: S,
    limits: PartLimits,
    header: PartHeader,
    /// `None` only between closing one part and opening the next
    current: Option<OpenPart<S::Part>>,
    finished: Vec<PartSummary>,
}

impl<S: PartStore> PartWriter<S> {
    /// Open part 1 and write its header
    pub fn start(mut store: S, limits: PartLimits, header: PartHeader) -> Result<Self> {
        let current = Self::open_part(&mut store, &limits, &header, 1)?;
        Ok(Self {
            store,
            limits,
            header,
            current: Some(current),
            finished: Vec::new(),
        })
    }

    /// Append a block, starting a new part first if it would not fit
    pub fn submit(&mut self, block: &ContentBlock) -> Result<()> {
        let len = block.len() as u64;
        let threshold = self.limits.threshold();

        let part = self.part_mut()?;
        let reserve = trailer_reserve(part.number);
        if part.blocks > 0 && part.offset + len + reserve > threshold {
            debug!(
                part = part.number,
                offset = part.offset,
                block = len,
                reserve,
                "part budget reached, splitting"
            );
            self.split()?;
        }

        self.write_raw(block.as_str())?;
        self.part_mut()?.blocks += 1;
        Ok(())
    }

    /// Write the final trailer, close the open part and report every part
    pub fn finish(mut self) -> Result<(S, Vec<PartSummary>)> {
        self.write_raw(&final_trailer())?;
        self.close_current()?;
        Ok((self.store, self.finished))
    }

    /// Number of the part currently open
    pub fn current_part(&self) -> Option<usize> {
        self.current.as_ref().map(|part| part.number)
    }

    /// Bytes written so far to the part currently open
    pub fn current_offset(&self) -> Option<u64> {
        self.current.as_ref().map(|part| part.offset)
    }

    fn split(&mut self) -> Result<()> {
        let number = self.part_mut()?.number;
        self.write_raw(&continuation_trailer(number))?;
        self.close_current()?;

        let next = Self::open_part(&mut self.store, &self.limits, &self.header, number + 1)?;
        self.current = Some(next);
        Ok(())
    }

    fn close_current(&mut self) -> Result<()> {
        let part = self.current.take().ok_or_else(no_open_part)?;
        let summary = PartSummary {
            number: part.number,
            location: self.store.describe(part.number),
            bytes: part.offset,
            blocks: part.blocks,
        };
        self.store.close(part.number, part.handle)?;
        self.finished.push(summary);
        Ok(())
    }

    fn part_mut(&mut self) -> Result<&mut OpenPart<S::Part>> {
        self.current.as_mut().ok_or_else(no_open_part)
    }

    fn write_raw(&mut self, text: &str) -> Result<()> {
        let part = self.current.as_mut().ok_or_else(no_open_part)?;
        if let Err(e) = part.handle.write_all(text.as_bytes()) {
            return Err(ReportError::output(self.store.describe(part.number), e));
        }
        part.offset += text.len() as u64;
        Ok(())
    }

    fn open_part(
        store: &mut S,
        limits: &PartLimits,
        header: &PartHeader,
        number: usize,
    ) -> Result<OpenPart<S::Part>> {
        let mut handle = store.open(number)?;
        let text = header.render(number, limits);
        handle
            .write_all(text.as_bytes())
            .map_err(|e| ReportError::output(store.describe(number), e))?;

        Ok(OpenPart {
            number,
            handle,
            offset: text.len() as u64,
            blocks: 0,
        })
    }
}

fn continuation_trailer(number: usize) -> String {
    format!(
        "--- End of report part {}; continued in part {} ---\n",
        number,
        number + 1
    )
}

fn final_trailer() -> String {
    format!("{}\nScan complete.\n", RULE)
}

/// Bytes kept free in part `number` for whichever trailer ends up closing it
fn trailer_reserve(number: usize) -> u64 {
    continuation_trailer(number).len().max(final_trailer().len()) as u64
}

fn no_open_part() -> ReportError {
    ReportError::Io(io::Error::new(
        io::ErrorKind::Other,
        "no report part is open",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentKind;
    use std::path::Path;
    use tempfile::tempdir;

    fn header() -> PartHeader {
        PartHeader {
            root: "/data/project".to_string(),
            generated_at: "2024-01-02 03:04:05".to_string(),
        }
    }

    fn header_len(number: usize, limits: &PartLimits) -> u64 {
        header().render(number, limits).len() as u64
    }

    /// Text block whose rendered size is exactly `size` bytes
    fn block_of_size(name: &str, size: usize) -> ContentBlock {
        let empty = ContentBlock::new(Path::new(name), ContentKind::Text, "");
        let fill = size.checked_sub(empty.len()).expect("block too small for its frame");
        let block = ContentBlock::new(Path::new(name), ContentKind::Text, &"x".repeat(fill));
        assert_eq!(block.len(), size);
        block
    }

    fn run(limits: PartLimits, blocks: &[ContentBlock]) -> (MemoryPartStore, Vec<PartSummary>) {
        let mut writer = PartWriter::start(MemoryPartStore::new(), limits, header()).unwrap();
        for block in blocks {
            writer.submit(block).unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn small_report_fits_in_one_part() {
        let limits = PartLimits {
            max_part_size: 1000,
            safety_margin: 0,
        };
        let (store, parts) = run(limits, &[block_of_size("a.txt", 120)]);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].blocks, 1);
        let text = &store.texts()[0];
        assert!(text.starts_with("--- Folder Scan Report (Part 1): /data/project ---"));
        assert!(text.contains("--- File path (TEXT): a.txt ---"));
        assert!(text.ends_with("Scan complete.\n"));
    }

    #[test]
    fn each_block_that_overflows_starts_a_new_part() {
        let limits = PartLimits {
            max_part_size: 1000,
            safety_margin: 0,
        };
        let blocks: Vec<ContentBlock> = ["a.txt", "b.txt", "c.txt"]
            .iter()
            .map(|name| block_of_size(name, 600))
            .collect();
        let (store, parts) = run(limits, &blocks);

        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.blocks == 1));
        assert_eq!(parts.iter().map(|p| p.number).collect::<Vec<_>>(), vec![1, 2, 3]);

        let texts = store.texts();
        assert!(texts[0].contains("a.txt") && texts[0].contains("continued in part 2"));
        assert!(texts[1].starts_with("--- Folder Scan Report (Part 2)"));
        assert!(texts[1].contains("b.txt") && texts[1].contains("continued in part 3"));
        assert!(texts[2].contains("c.txt") && texts[2].ends_with("Scan complete.\n"));
        assert!(!texts[2].contains("continued in part"));
    }

    #[test]
    fn tracked_offsets_match_written_bytes() {
        let limits = PartLimits {
            max_part_size: 2048,
            safety_margin: 128,
        };
        let blocks: Vec<ContentBlock> = (0..12)
            .map(|i| block_of_size(&format!("f{}.txt", i), 150 + 37 * i))
            .collect();
        let (store, parts) = run(limits, &blocks);

        assert_eq!(store.parts().len(), parts.len());
        for (bytes, summary) in store.parts().iter().zip(&parts) {
            assert_eq!(bytes.len() as u64, summary.bytes);
        }
        assert_eq!(parts.iter().map(|p| p.blocks).sum::<usize>(), blocks.len());
    }

    #[test]
    fn parts_stay_under_the_ceiling() {
        let limits = PartLimits {
            max_part_size: 4096,
            safety_margin: 0,
        };
        let sizes = [900, 1200, 180, 3000, 450, 450, 450, 2500, 200, 1700, 1700, 160];
        let blocks: Vec<ContentBlock> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| block_of_size(&format!("f{}.rs", i), *size))
            .collect();
        let (store, parts) = run(limits, &blocks);

        for bytes in store.parts() {
            assert!(bytes.len() as u64 <= limits.max_part_size);
        }
        assert!(parts.len() > 1);
    }

    #[test]
    fn trailers_count_against_the_ceiling_without_margin() {
        let limits = PartLimits {
            max_part_size: 1000,
            safety_margin: 0,
        };
        // two blocks that fit next to the header, but not with a trailer as well
        let room = (limits.max_part_size - header_len(1, &limits)) as usize;
        let size = (room - 40) / 2;
        let blocks = vec![block_of_size("a.txt", size), block_of_size("b.txt", size)];
        let (store, parts) = run(limits, &blocks);

        assert_eq!(parts.len(), 2);
        for (bytes, summary) in store.parts().iter().zip(&parts) {
            assert_eq!(summary.blocks, 1);
            assert!(bytes.len() as u64 <= limits.max_part_size);
        }
        assert!(store.texts()[1].ends_with("Scan complete.\n"));
    }

    #[test]
    fn block_filling_the_part_without_room_for_a_trailer_is_alone() {
        let limits = PartLimits {
            max_part_size: 1000,
            safety_margin: 0,
        };
        let size = (limits.max_part_size - header_len(1, &limits) - 4) as usize;
        let blocks = vec![block_of_size("a.txt", size), block_of_size("b.txt", size)];
        let (_, parts) = run(limits, &blocks);

        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.blocks == 1));
        assert_eq!(trailer_reserve(1), final_trailer().len() as u64);
    }

    #[test]
    fn oversized_block_is_written_whole_into_a_fresh_part() {
        let limits = PartLimits {
            max_part_size: 1000,
            safety_margin: 100,
        };
        let blocks = vec![
            block_of_size("small.txt", 200),
            block_of_size("huge.txt", 2500),
            block_of_size("after.txt", 200),
        ];
        let (store, parts) = run(limits, &blocks);

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].blocks, 1);
        assert!(parts[1].bytes > limits.max_part_size);
        assert!(store.texts()[1].contains(&"x".repeat(2000)));
        assert!(store.texts()[2].contains("after.txt"));
    }

    #[test]
    fn oversized_first_block_does_not_leave_an_empty_part() {
        let limits = PartLimits {
            max_part_size: 500,
            safety_margin: 0,
        };
        let (_, parts) = run(limits, &[block_of_size("huge.txt", 900)]);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].blocks, 1);
    }

    #[test]
    fn empty_scan_still_produces_a_closed_part() {
        let limits = PartLimits::default();
        let (store, parts) = run(limits, &[]);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].blocks, 0);
        assert_eq!(parts[0].bytes, store.parts()[0].len() as u64);
        assert!(store.texts()[0].contains("Max size per part: 185.00 MB."));
    }

    #[test]
    fn offset_starts_after_header() {
        let limits = PartLimits::default();
        let writer = PartWriter::start(MemoryPartStore::new(), limits, header()).unwrap();
        assert_eq!(writer.current_part(), Some(1));
        assert_eq!(writer.current_offset(), Some(header_len(1, &limits)));
    }

    #[test]
    fn file_store_writes_numbered_parts() {
        let dir = tempdir().unwrap();
        let limits = PartLimits {
            max_part_size: 1000,
            safety_margin: 0,
        };
        let store = FilePartStore::new(dir.path(), "scan-report-demo-20240102_030405");
        let mut writer = PartWriter::start(store, limits, header()).unwrap();
        writer.submit(&block_of_size("a.txt", 600)).unwrap();
        writer.submit(&block_of_size("b.txt", 600)).unwrap();
        let (store, parts) = writer.finish().unwrap();

        assert_eq!(parts.len(), 2);
        for part in &parts {
            let path = store.part_path(part.number);
            assert!(path.ends_with(format!("scan-report-demo-20240102_030405-part{}.txt", part.number)));
            assert_eq!(std::fs::metadata(&path).unwrap().len(), part.bytes);
        }
    }

    #[test]
    fn unwritable_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let store = FilePartStore::new(dir.path().join("missing"), "report");
        let err = PartWriter::start(store, PartLimits::default(), header()).err().unwrap();
        assert!(matches!(err, ReportError::Output { .. }));
    }
}
