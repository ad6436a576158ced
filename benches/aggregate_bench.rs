use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use shimstat::report::aggregate::aggregate;
use shimstat::report::builder::{ReportBuilder, ReportOptions};
use shimstat::report::identifier::{DEFAULT_FLAG, DEFAULT_MAX_SCAN_BYTES, FlagExtractor};
use shimstat::system::arguments::{ArgumentReader, join_argv};
use shimstat::system::platform::ArgumentBytes;
use shimstat::system::process::{MemoryContext, MemoryUsage, ProcessRecord, ProcessTable};
use shimstat::system::snapshot::{SnapshotError, SnapshotSource, SystemMemory, SystemSnapshot};
use std::hint::black_box;

fn make_processes(n: usize) -> Vec<ProcessRecord> {
    (0..n)
        .map(|i| {
            let pid = i as u32 + 1;
            let ppid = if i == 0 { 0 } else { (i as u32 / 2) + 1 };
            let name = if i % 16 == 1 {
                "containerd-shim".to_string()
            } else {
                format!("proc_{i}")
            };
            ProcessRecord {
                pid,
                parent: Some(ppid),
                children: Vec::new(),
                memory: MemoryContext::Present(MemoryUsage {
                    virtual_bytes: ((n - i) as u64 + 1) * 4096,
                    resident_bytes: ((n - i) as u64 + 1) * 1024,
                }),
                cpu_time_ms: (i % 100) as u64,
                run_time_ms: 60_000,
                argv: vec![name.clone(), "-id".to_string(), format!("ctr{pid}")],
                name,
            }
        })
        .collect()
}

struct MockHost(Vec<ProcessRecord>);

impl SnapshotSource for MockHost {
    fn snapshot(&self) -> Result<SystemSnapshot, SnapshotError> {
        Ok(SystemSnapshot {
            memory: SystemMemory {
                total_bytes: 16 << 30,
                free_bytes: 8 << 30,
            },
            uptime_ms: 3_600_000,
            table: ProcessTable::from_flat(self.0.clone()),
        })
    }
}

struct SnapshotArgv;

impl ArgumentReader for SnapshotArgv {
    fn read_arguments(
        &self,
        process: &ProcessRecord,
        limit: usize,
    ) -> std::io::Result<ArgumentBytes> {
        Ok(join_argv(&process.argv, limit))
    }
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let table = ProcessTable::from_flat(make_processes(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| black_box(aggregate(black_box(table), 1)))
        });
    }

    group.finish();
}

fn bench_report_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_build_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let builder = ReportBuilder::new(
            MockHost(make_processes(size)),
            FlagExtractor::new(SnapshotArgv, DEFAULT_FLAG, DEFAULT_MAX_SCAN_BYTES),
            ReportOptions::default(),
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &builder, |b, builder| {
            b.iter(|| black_box(builder.build()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_report_build);
criterion_main!(benches);
