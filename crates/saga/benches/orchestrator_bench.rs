use async_trait::async_trait;
use criterion::{Criterion, criterion_group, criterion_main};
use saga::{Orchestrator, Step};

#[derive(Debug)]
struct BenchError;

impl std::fmt::Display for BenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("bench failure")
    }
}

struct Counter {
    fail: bool,
}

#[async_trait]
impl Step<u64, BenchError> for Counter {
    fn name(&self) -> &'static str {
        "counter"
    }

    async fn execute(&mut self, ctx: &mut u64) -> Result<(), BenchError> {
        if self.fail {
            return Err(BenchError);
        }
        *ctx += 1;
        Ok(())
    }

    async fn compensate(&mut self, ctx: &mut u64) -> Result<(), BenchError> {
        *ctx -= 1;
        Ok(())
    }
}

fn build(steps: usize, fail_last: bool) -> Orchestrator<u64, BenchError> {
    let mut orchestrator = Orchestrator::new("bench");
    for i in 0..steps {
        orchestrator.add_step(Counter {
            fail: fail_last && i + 1 == steps,
        });
    }
    orchestrator
}

fn bench_two_step_success(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("saga/two_steps_success", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut ctx = 0;
                build(2, false).run(&mut ctx).await.unwrap();
            });
        });
    });
}

fn bench_rollback_10(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("saga/rollback_10_steps", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut ctx = 0;
                let result = build(10, true).run(&mut ctx).await;
                assert!(result.is_err());
                assert_eq!(ctx, 0);
            });
        });
    });
}

criterion_group!(benches, bench_two_step_success, bench_rollback_10);
criterion_main!(benches);
