//! # Interpolation Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use motor_lib::{
    interp::{interpolate_speed, interpolate_steer, CalibTable},
    servo_ctrl::{LogPwm, PulseWidth},
    speed_ctrl::{self, SpeedCtrl},
};

/// Breakpoints in each direction of the full speed table.
const NUM_BREAKPOINTS: i32 = 25;

fn speed_table() -> CalibTable {
    let domain_pos: Vec<i32> = (1..=NUM_BREAKPOINTS).map(|i| i * 20).collect();
    let domain_neg: Vec<i32> = domain_pos.iter().map(|d| -d).collect();
    let output_pos = (0..NUM_BREAKPOINTS)
        .map(|i| PulseWidth((1520 + i * 15) as u16))
        .collect();
    let output_neg = (0..NUM_BREAKPOINTS)
        .map(|i| PulseWidth((1480 - i * 15) as u16))
        .collect();

    CalibTable::new(domain_pos, domain_neg, output_pos, output_neg).unwrap()
}

fn interp_benchmark(c: &mut Criterion) {
    let table = speed_table();
    let neutral = PulseWidth(1500);

    c.bench_function("interpolate_speed sweep", |b| {
        b.iter(|| {
            for speed in -550..=550 {
                black_box(interpolate_speed(&table, black_box(speed), neutral));
            }
        })
    });

    c.bench_function("interpolate_steer sweep", |b| {
        b.iter(|| {
            for angle in -550..=550 {
                black_box(interpolate_steer(&table, black_box(angle)));
            }
        })
    });

    let params = speed_ctrl::Params {
        inf_limit: -500,
        sup_limit: 500,
        calib_inf_limit: speed_ctrl::CALIB_INF_LIMIT,
        calib_sup_limit: speed_ctrl::CALIB_SUP_LIMIT,
        neutral_us: neutral,
        period_ms: speed_ctrl::DEFAULT_PERIOD_MS,
        mode: Default::default(),
        reverse_direction: true,
        table,
    };
    let mut ctrl = SpeedCtrl::new(LogPwm::new("bench"), params).unwrap();

    c.bench_function("SpeedCtrl::set_speed", |b| {
        b.iter(|| {
            black_box(ctrl.set_speed(black_box(-333)).unwrap());
        })
    });
}

criterion_group!(benches, interp_benchmark);
criterion_main!(benches);
