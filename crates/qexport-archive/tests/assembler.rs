//! Archive Assembly Tests
//!
//! Archives are read back with `zip::ZipArchive` to check what a caller would receive.

use futures::channel::oneshot;
use futures::future;
use futures::stream::{self, StreamExt};
use pretty_assertions::assert_eq;
use qexport_archive::{
    AbortSignal, ArchiveAssembler, ArchiveError, ArchiveResult, Entry, EntryStatus, SpoolWriter,
    byte_channel,
};
use rstest::rstest;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::Poll;
use std::time::Duration;
use zip::ZipArchive;

// ============================================================================
// Test Helpers
// ============================================================================

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assembler() -> ArchiveAssembler<Cursor<Vec<u8>>> {
    ArchiveAssembler::new(Cursor::new(Vec::new()), AbortSignal::never())
}

fn chunk(text: &str) -> ArchiveResult<Vec<u8>> {
    Ok(text.as_bytes().to_vec())
}

/// Entry names and contents in archive order
fn read_back(archive: Vec<u8>) -> Vec<(String, String)> {
    let mut archive = ZipArchive::new(Cursor::new(archive)).unwrap();
    (0..archive.len())
        .map(|index| {
            let mut file = archive.by_index(index).unwrap();
            let mut content = String::new();
            file.read_to_string(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

fn entry(name: &str, content: &str) -> (String, String) {
    (name.to_string(), content.to_string())
}

fn contains(bytes: &[u8], needle: &[u8]) -> bool {
    bytes.windows(needle.len()).any(|window| window == needle)
}

// ============================================================================
// Entry Writing
// ============================================================================

#[tokio::test]
async fn test_entries_keep_registration_order() {
    let mut assembler = assembler();
    assembler.register(Entry::chunks(
        "answers_Studie_Befinden_v1.csv",
        [chunk("participant;q1\n"), chunk("p1;1\n"), chunk("p2;.R\n")],
    ));
    assembler.register(Entry::buffer("readme.txt", "export"));
    assert_eq!(assembler.pending(), 2);

    let (archive, report) = assembler.finalize().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(
        report.status("answers_Studie_Befinden_v1.csv"),
        Some(&EntryStatus::Completed { bytes: 26 })
    );
    assert_eq!(
        read_back(archive.into_inner()),
        vec![
            entry("answers_Studie_Befinden_v1.csv", "participant;q1\np1;1\np2;.R\n"),
            entry("readme.txt", "export"),
        ]
    );
}

#[tokio::test]
async fn test_empty_archive_is_valid() {
    let (archive, report) = assembler().finalize().await.unwrap();
    assert!(report.is_complete());
    assert!(read_back(archive.into_inner()).is_empty());
}

#[tokio::test]
async fn test_archive_written_to_file() {
    let file = tempfile::tempfile().unwrap();
    let mut assembler = ArchiveAssembler::new(file, AbortSignal::never())
        .with_compression(zip::CompressionMethod::Stored);
    assembler.register(Entry::buffer("a.csv", "a;b\n"));

    let (file, report) = assembler.finalize().await.unwrap();
    assert!(report.is_complete());

    let mut archive = ZipArchive::new(file).unwrap();
    let mut content = String::new();
    archive.by_name("a.csv").unwrap().read_to_string(&mut content).unwrap();
    assert_eq!(content, "a;b\n");
}

// ============================================================================
// Partial Failures
// ============================================================================

#[tokio::test]
async fn test_failing_source_only_truncates_its_entry() {
    init_logging();
    let mut assembler = assembler();
    assembler.register(Entry::buffer("codebook.csv", "column\nq1\n"));
    assembler.register(Entry::chunks(
        "answers.csv",
        [
            chunk("participant;q1\n"),
            chunk("p1;1\n"),
            Err(ArchiveError::upstream("connection reset")),
            chunk("never written\n"),
        ],
    ));
    assembler.register(Entry::buffer("other.csv", "x\n"));

    let (archive, report) = assembler.finalize().await.unwrap();
    assert!(!report.is_complete());
    assert!(!report.aborted);
    assert_eq!(
        report.status("answers.csv"),
        Some(&EntryStatus::Truncated {
            bytes: 20,
            error: "Upstream source failed: connection reset".to_string(),
        })
    );
    assert_eq!(report.failures().count(), 1);
    assert_eq!(
        read_back(archive.into_inner()),
        vec![
            entry("codebook.csv", "column\nq1\n"),
            entry("answers.csv", "participant;q1\np1;1\n"),
            entry("other.csv", "x\n"),
        ]
    );
}

#[tokio::test]
async fn test_writer_errors_are_fatal() {
    let mut assembler = assembler();
    assembler.register(Entry::chunks(
        "broken.csv",
        [Err(ArchiveError::Io(std::io::Error::other("disk full")))],
    ));
    assert!(matches!(assembler.finalize().await, Err(ArchiveError::Io(_))));
}

#[rstest]
#[case::buffer(Entry::buffer("a.csv", "second"))]
#[case::stream(Entry::chunks("a.csv", [chunk("sec"), chunk("ond")]))]
#[case::deferred_output(Entry::deferred("more", || {
    Box::pin(async { Ok(vec![Entry::buffer("a.csv", "second")]) })
}))]
#[tokio::test]
async fn test_duplicate_names_are_skipped(#[case] duplicate: Entry) {
    let mut assembler = assembler();
    assembler.register(Entry::buffer("a.csv", "first"));
    assembler.register(duplicate);

    let (archive, report) = assembler.finalize().await.unwrap();
    assert_eq!(report.failures().count(), 1);
    assert!(
        report
            .entries
            .iter()
            .any(|entry| entry.name == "a.csv" && matches!(entry.status, EntryStatus::Failed { .. }))
    );
    assert_eq!(read_back(archive.into_inner()), vec![entry("a.csv", "first")]);
}

// ============================================================================
// Deferred Entries
// ============================================================================

#[tokio::test]
async fn test_deferred_entries_run_after_preceding_stream() {
    let drained = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&drained);
    let rows = stream::iter([chunk("participant;file\n"), chunk("p1;7-scan.png\n")]).chain(
        stream::poll_fn(move |_| {
            flag.store(true, Ordering::SeqCst);
            Poll::Ready(None)
        }),
    );

    let mut assembler = assembler();
    assembler.register(Entry::stream("answers.csv", Box::pin(rows)));
    assembler.register(Entry::deferred("files", move || {
        Box::pin(async move {
            assert!(drained.load(Ordering::SeqCst));
            Ok(vec![
                Entry::buffer("files/7-scan.png", b"PNG".to_vec()),
                Entry::buffer("files/8-notes.txt", "notes"),
            ])
        })
    }));
    assembler.register(Entry::buffer("codebook.csv", "column\n"));

    let (archive, report) = assembler.finalize().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.status("files"), Some(&EntryStatus::Expanded { entries: 2 }));

    let names: Vec<_> = read_back(archive.into_inner())
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        names,
        ["answers.csv", "files/7-scan.png", "files/8-notes.txt", "codebook.csv"]
    );
}

#[tokio::test]
async fn test_failed_deferred_lookup_keeps_archive() {
    init_logging();
    let mut assembler = assembler();
    assembler.register(Entry::buffer("answers.csv", "a\n"));
    assembler.register(Entry::deferred("files", || {
        Box::pin(async { Err(ArchiveError::upstream("file table unavailable")) })
    }));

    let (archive, report) = assembler.finalize().await.unwrap();
    assert!(matches!(report.status("files"), Some(EntryStatus::Failed { .. })));
    assert_eq!(read_back(archive.into_inner()), vec![entry("answers.csv", "a\n")]);
}

// ============================================================================
// Forward-Only Output
// ============================================================================

#[tokio::test]
async fn test_spooled_archive_matches_layout() {
    let mut assembler = ArchiveAssembler::new(SpoolWriter::new(Vec::new()), AbortSignal::never());
    assembler.register(Entry::buffer("codebook.csv", "column\n"));
    assembler.register(Entry::chunks("answers.csv", [chunk("participant\n"), chunk("p1\n")]));

    let (writer, report) = assembler.finalize().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(writer.spooled(), 0);
    assert_eq!(
        read_back(writer.into_inner().unwrap()),
        vec![entry("codebook.csv", "column\n"), entry("answers.csv", "participant\np1\n")]
    );
}

#[tokio::test]
async fn test_finished_entries_reach_sink_before_archive_is_closed() {
    let (writer, mut receiver) = byte_channel();
    let (release, released) = oneshot::channel::<()>();
    let waiting = stream::once(async move {
        let _ = released.await;
        chunk("p1;2\n")
    });

    let mut assembler = ArchiveAssembler::new(writer, AbortSignal::never());
    assembler.register(Entry::buffer("codebook.csv", "column\nq1\n"));
    assembler.register(Entry::stream(
        "answers.csv",
        Box::pin(stream::iter([chunk("participant;q1\n")]).chain(waiting)),
    ));

    let export = async {
        let (writer, report) = assembler.finalize().await.unwrap();
        drop(writer);
        report
    };
    let consume = async {
        let mut received = Vec::new();
        let mut release = Some(release);
        while let Some(bytes) = receiver.next().await {
            received.extend_from_slice(&bytes);
            if let Some(release) = release.take_if(|_| contains(&received, b"codebook.csv")) {
                release.send(()).unwrap();
            }
        }
        (received, release.is_none())
    };

    let (report, (received, released_early)) = tokio::time::timeout(
        Duration::from_secs(5),
        async { tokio::join!(export, consume) },
    )
    .await
    .expect("answers entry waits for the codebook to be read");

    assert!(report.is_complete());
    assert!(released_early);
    assert_eq!(
        read_back(received),
        vec![
            entry("codebook.csv", "column\nq1\n"),
            entry("answers.csv", "participant;q1\np1;2\n"),
        ]
    );
}

// ============================================================================
// Abort
// ============================================================================

#[tokio::test]
async fn test_abort_before_finalize_skips_everything() {
    let (handle, signal) = AbortSignal::new();
    let mut assembler = ArchiveAssembler::new(Cursor::new(Vec::new()), signal);
    assembler.register(Entry::buffer("a.csv", "a"));
    assembler.register(Entry::buffer("b.csv", "b"));
    handle.abort();

    let (archive, report) = assembler.finalize().await.unwrap();
    assert!(report.aborted);
    assert!(report.entries.iter().all(|entry| entry.status == EntryStatus::Skipped));
    assert!(read_back(archive.into_inner()).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_interrupts_stalled_stream() {
    let stalled = stream::iter([chunk("participant\n")]).chain(stream::pending());
    let signal = AbortSignal::never().with_timeout(Duration::from_secs(60));

    let mut assembler = ArchiveAssembler::new(Cursor::new(Vec::new()), signal);
    assembler.register(Entry::buffer("codebook.csv", "column\n"));
    assembler.register(Entry::stream("answers.csv", Box::pin(stalled)));
    assembler.register(Entry::buffer("late.csv", "never"));

    let (archive, report) = assembler.finalize().await.unwrap();
    assert!(report.aborted);
    assert_eq!(
        report.status("answers.csv"),
        Some(&EntryStatus::Interrupted { bytes: 12 })
    );
    assert_eq!(report.status("late.csv"), Some(&EntryStatus::Skipped));
    assert_eq!(
        read_back(archive.into_inner()),
        vec![entry("codebook.csv", "column\n"), entry("answers.csv", "participant\n")]
    );
}

#[rstest]
#[case::stream(
    Entry::stream("stalled", Box::pin(stream::pending::<ArchiveResult<Vec<u8>>>())),
    EntryStatus::Interrupted { bytes: 0 }
)]
#[case::deferred(
    Entry::deferred("stalled", || Box::pin(future::pending::<ArchiveResult<Vec<Entry>>>())),
    EntryStatus::Skipped
)]
#[tokio::test(start_paused = true)]
async fn test_timeout_ends_stalled_source(#[case] stalled: Entry, #[case] expected: EntryStatus) {
    let signal = AbortSignal::never().with_timeout(Duration::from_secs(1));
    let mut assembler = ArchiveAssembler::new(Cursor::new(Vec::new()), signal);
    assembler.register(stalled);
    assembler.register(Entry::buffer("late.csv", "never"));

    let (archive, report) = assembler.finalize().await.unwrap();
    assert!(report.aborted);
    assert_eq!(report.status("stalled"), Some(&expected));
    assert_eq!(report.status("late.csv"), Some(&EntryStatus::Skipped));
    assert!(!read_back(archive.into_inner()).iter().any(|(name, _)| name == "late.csv"));
}
