//! Dispatch throughput: prefix-heavy tables, counts and registers.

use core_actions::{CommandRunner, MotionBind, MotionCapture};
use core_config::RunnerConfig;
use core_events::{KeyInput, KeyInputSet, parse_keys};
use core_keymap::{CommandBinding, CommandFlags, CommandResult, MotionKind, MotionResult};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Every key completes a one-character motion.
struct OneKeyMotion;

impl MotionCapture for OneKeyMotion {
    fn reset(&mut self) {}

    fn process(&mut self, _key: KeyInput) -> MotionBind {
        MotionBind::Complete(MotionResult::new(0..1, MotionKind::CharacterExclusive, true))
    }
}

fn build_runner() -> CommandRunner {
    let runner = CommandRunner::new(RunnerConfig::default(), Box::new(OneKeyMotion));
    let completed = |_: &core_keymap::CommandContext| CommandResult::Completed;
    for c in 'a'..='z' {
        let single = KeyInputSet::single(KeyInput::char(c));
        let keys = KeyInputSet::new([KeyInput::char('g'), KeyInput::char(c)]).unwrap();
        let z_keys = KeyInputSet::new([KeyInput::char('z'), KeyInput::char(c)]).unwrap();
        if c != 'g' && c != 'z' && c != 'd' {
            runner
                .add(CommandBinding::simple(single, CommandFlags::empty(), completed))
                .unwrap();
        }
        runner
            .add(CommandBinding::simple(keys, CommandFlags::empty(), completed))
            .unwrap();
        runner
            .add(CommandBinding::simple(z_keys, CommandFlags::empty(), completed))
            .unwrap();
    }
    runner
        .add(CommandBinding::motion(
            KeyInputSet::single(KeyInput::char('d')),
            CommandFlags::empty(),
            completed,
        ))
        .unwrap();
    runner
}

fn bench_dispatch(c: &mut Criterion) {
    let runner = build_runner();
    let stream = parse_keys("x2gg\"a3zzdw12j<Esc>gq\"byy").unwrap();

    c.bench_function("dispatch_mixed_stream", |b| {
        b.iter(|| {
            for key in &stream {
                black_box(runner.run(*key));
            }
            runner.reset_state();
        })
    });

    let single = parse_keys("x").unwrap();
    c.bench_function("dispatch_single_key", |b| {
        b.iter(|| black_box(runner.run(single[0])))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(std::time::Duration::from_secs(3));
    targets = bench_dispatch
}
criterion_main!(benches);
