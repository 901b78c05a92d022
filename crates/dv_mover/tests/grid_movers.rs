// crates/dv_mover/tests/grid_movers.rs

//! 格点 mover 端到端测试：扫描、区间选择、插值、位移和持久化

use dv_config::{MoverConfig, MoverKind};
use dv_foundation::{ErrorKind, VelocityUnits, MAX_ERROR_MESSAGE_LEN};
use dv_mesh::{meters_to_degrees, WorldPoint3D, METERS_PER_DEGREE_LAT};
use dv_mover::{AnyMover, Bracket, IntervalCheck, LeRecord, LeStatus, Mover, MoverSet, ScanState};
use glam::DVec2;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// 2000-02-14 10:00 UTC
const T0: f64 = 950_522_400.0;
const HOUR: f64 = 3600.0;

const STAMPS: [&str; 4] = [
    "14 2 2000 10 00",
    "14 2 2000 11 00",
    "14 2 2000 12 00",
    "14 2 2000 13 00",
];

/// 写一个 2x2 网格文件，每帧所有节点速度相同
fn write_field(dir: &Path, name: &str, signature: &str, frames: &[(&str, f64, f64)]) -> PathBuf {
    let mut text = format!(
        "{signature}\nNUMROWS 2\nNUMCOLS 2\nLOLAT 30.0\nHILAT 31.0\nLOLONG -120.0\nHILONG -119.0\n"
    );
    for (stamp, u, v) in frames {
        text.push_str(&format!("[TIME] {stamp}\n"));
        for row in 1..=2 {
            for col in 1..=2 {
                text.push_str(&format!("{row} {col} {u} {v}\n"));
            }
        }
    }
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn two_record_current(dir: &Path) -> PathBuf {
    write_field(
        dir,
        "bay.cur",
        "[GRIDCURTIME] m/s",
        &[(STAMPS[0], 1.0, 0.0), (STAMPS[1], 3.0, 0.0)],
    )
}

fn inside() -> DVec2 {
    DVec2::new(-119.5, 30.5)
}

#[test]
fn test_midpoint_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let mut mover = AnyMover::from_path(&two_record_current(dir.path())).unwrap();

    assert_eq!(mover.class_id(), MoverKind::GridCurrent);
    assert_eq!(mover.state(), ScanState::Indexed);
    assert_eq!(mover.time_count(), 2);
    assert_eq!(mover.file_count(), 1);
    assert_eq!(mover.grid_bounds().unwrap().lo_x, -120.0);

    let v = mover.velocity_at(inside(), T0 + 1800.0).unwrap();
    assert!((v.x - 2.0).abs() < 1e-9);
    assert!(v.y.abs() < 1e-9);
    assert_eq!(mover.state(), ScanState::Bracketed);
}

#[test]
fn test_exact_record_times() {
    let dir = tempfile::tempdir().unwrap();
    let mut mover = AnyMover::from_path(&two_record_current(dir.path())).unwrap();

    let v0 = mover.velocity_at(inside(), T0).unwrap();
    let v1 = mover.velocity_at(inside(), T0 + HOUR).unwrap();
    assert!((v0.x - 1.0).abs() < 1e-12);
    assert!((v1.x - 3.0).abs() < 1e-12);
}

#[test]
fn test_index_strictly_ascending() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_field(
        dir.path(),
        "shuffled.cur",
        "[GRIDCURTIME] m/s",
        &[
            (STAMPS[2], 0.0, 0.0),
            (STAMPS[0], 0.0, 0.0),
            (STAMPS[2], 1.0, 0.0),
            (STAMPS[1], 0.0, 0.0),
        ],
    );
    let mover = AnyMover::from_path(&path).unwrap();
    let scan = mover.source().scan().unwrap();
    assert_eq!(scan.index.len(), 3);
    assert!(scan.index.is_strictly_ascending());
}

#[test]
fn test_time_range_without_extrapolation() {
    let dir = tempfile::tempdir().unwrap();
    let path = two_record_current(dir.path());
    let mut mover = AnyMover::from_config(MoverConfig::new(MoverKind::GridCurrent, &path)).unwrap();

    let err = mover.prepare_for_model_step(T0 + 2.0 * HOUR, 900.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TimeRange);

    let err = mover.prepare_for_model_step(T0 - 1.0, 900.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TimeRange);

    // 失败后索引保留，下一次合法调用正常工作
    assert_eq!(mover.state(), ScanState::Indexed);
    mover.prepare_for_model_step(T0, 900.0).unwrap();
    assert_eq!(mover.state(), ScanState::Bracketed);
}

#[test]
fn test_extrapolation_clamps_to_boundary_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = two_record_current(dir.path());
    let config = MoverConfig::new(MoverKind::GridCurrent, &path).with_extrapolation(true);
    let mut mover = AnyMover::from_config(config).unwrap();

    let after = mover.velocity_at(inside(), T0 + 10.0 * HOUR).unwrap();
    assert!((after.x - 3.0).abs() < 1e-12);
    assert_eq!(
        mover.source().field().unwrap().loaded().bracket(),
        Some(Bracket::Single(1))
    );

    let before = mover.velocity_at(inside(), T0 - 10.0 * HOUR).unwrap();
    assert!((before.x - 1.0).abs() < 1e-12);
}

#[test]
fn test_off_grid_is_non_fatal_and_stateless() {
    let dir = tempfile::tempdir().unwrap();
    let mut mover = AnyMover::from_path(&two_record_current(dir.path())).unwrap();
    mover.prepare_for_model_step(T0, 900.0).unwrap();
    let bracket = mover.source().field().unwrap().loaded().bracket();

    let stray = LeRecord::surface(10.0, 10.0, 0.0);
    let err = mover.get_move(&stray, T0, 900.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OffGrid);
    assert_eq!(mover.source().field().unwrap().loaded().bracket(), bracket);

    let les = [stray, LeRecord::surface(-119.5, 30.5, 0.0)];
    let mut out = [WorldPoint3D::ZERO; 2];
    mover.get_moves(&les, T0, 900.0, &mut out).unwrap();
    assert_eq!(out[0], WorldPoint3D::ZERO);
    assert!(out[1].p.x > 0.0);
}

#[test]
fn test_displacement_in_degrees() {
    let dir = tempfile::tempdir().unwrap();
    let path = two_record_current(dir.path());
    let config = MoverConfig::new(MoverKind::GridCurrent, &path).with_scale(0.5);
    let mut mover = AnyMover::from_config(config).unwrap();

    mover.prepare_for_model_run().unwrap();
    mover.prepare_for_model_step(T0 + 1800.0, 900.0).unwrap();

    let le = LeRecord::surface(-119.5, 30.5, 0.0);
    let delta = mover.get_move(&le, T0 + 1800.0, 900.0).unwrap();
    mover.model_step_is_done();

    // 2 m/s * 0.5 * 900 s = 900 m 向东
    let expected = 900.0 / (METERS_PER_DEGREE_LAT * 30.5_f64.to_radians().cos());
    assert!((delta.p.x - expected).abs() < 1e-12);
    assert!(delta.p.y.abs() < 1e-15);
    assert_eq!(delta.z, 0.0);
}

#[test]
fn test_only_in_water_particles_move() {
    let dir = tempfile::tempdir().unwrap();
    let mut mover = AnyMover::from_path(&two_record_current(dir.path())).unwrap();
    mover.prepare_for_model_step(T0, 900.0).unwrap();

    for status in [LeStatus::NotReleased, LeStatus::OnLand, LeStatus::OffMaps, LeStatus::Evaporated] {
        let le = LeRecord::surface(-119.5, 30.5, 0.0).with_status(status);
        assert_eq!(mover.get_move(&le, T0, 900.0).unwrap(), WorldPoint3D::ZERO);
    }
}

#[test]
fn test_units_converted_at_scan() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_field(
        dir.path(),
        "cms.cur",
        "[GRIDCURTIME] cm/s",
        &[(STAMPS[0], 50.0, 0.0)],
    );
    let mut mover = AnyMover::from_path(&path).unwrap();
    assert_eq!(mover.source().units(), Some(VelocityUnits::CentimetersPerSecond));

    let v = mover.velocity_at(inside(), T0).unwrap();
    assert!((v.x - 0.5).abs() < 1e-12);
}

#[test]
fn test_unit_mismatch_and_missing_units() {
    let dir = tempfile::tempdir().unwrap();
    let declared = two_record_current(dir.path());
    let config = MoverConfig::new(MoverKind::GridCurrent, &declared).with_units(VelocityUnits::Knots);
    let mut mover = AnyMover::from_config(config).unwrap();
    let err = mover.prepare_for_model_step(T0, 900.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let bare = write_field(dir.path(), "bare.cur", "[GRIDCURTIME]", &[(STAMPS[0], 1.0, 0.0)]);
    let mut mover = AnyMover::from_config(MoverConfig::new(MoverKind::GridCurrent, &bare)).unwrap();
    assert_eq!(mover.prepare_for_model_step(T0, 900.0).unwrap_err().kind(), ErrorKind::Config);

    let config = MoverConfig::new(MoverKind::GridCurrent, &bare).with_units(VelocityUnits::Knots);
    let mut mover = AnyMover::from_config(config).unwrap();
    let v = mover.velocity_at(inside(), T0).unwrap();
    assert!((v.x - 1852.0 / 3600.0).abs() < 1e-12);
}

#[test]
fn test_kind_mismatch_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = two_record_current(dir.path());
    let mut mover = AnyMover::from_config(MoverConfig::new(MoverKind::GridWind, &path)).unwrap();
    let err = mover.prepare_for_model_step(T0, 900.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_single_record_is_steady() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_field(dir.path(), "steady.cur", "[GRIDCURTIME] m/s", &[(STAMPS[1], 0.25, -0.5)]);
    let mut mover = AnyMover::from_path(&path).unwrap();

    for t in [T0 - 1.0e6, T0 + HOUR, T0 + 1.0e7] {
        mover.prepare_for_model_step(t, 900.0).unwrap();
        let v = mover.velocity_at(inside(), t).unwrap();
        assert!((v - DVec2::new(0.25, -0.5)).length() < 1e-12);
        mover.model_step_is_done();
    }
}

#[test]
fn test_check_interval_reports_next_bracket() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_field(
        dir.path(),
        "three.cur",
        "[GRIDCURTIME] m/s",
        &[(STAMPS[0], 1.0, 0.0), (STAMPS[1], 2.0, 0.0), (STAMPS[2], 4.0, 0.0)],
    );
    let mut mover = AnyMover::from_path(&path).unwrap();
    let source = mover.source_mut();

    assert_eq!(source.check_interval(T0 + 60.0).unwrap(), IntervalCheck::NeedsLoad(Bracket::Between(0, 1)));
    source.set_interval(T0 + 60.0).unwrap();
    assert_eq!(source.check_interval(T0 + 120.0).unwrap(), IntervalCheck::Valid);
    assert_eq!(
        source.check_interval(T0 + 1.5 * HOUR).unwrap(),
        IntervalCheck::NeedsLoad(Bracket::Between(1, 2))
    );
    // 最后一条记录本身仍用最后一个区间
    assert_eq!(source.bracket_for(T0 + 2.0 * HOUR).unwrap(), Bracket::Between(1, 2));

    source.set_interval(T0 + 1.5 * HOUR).unwrap();
    let v = source.velocity_at(inside(), T0 + 1.5 * HOUR).unwrap();
    assert!((v.x - 3.0).abs() < 1e-12);
}

#[test]
fn test_dispose_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let mut mover = AnyMover::from_path(&two_record_current(dir.path())).unwrap();
    mover.prepare_for_model_step(T0, 900.0).unwrap();

    mover.source_mut().clear_loaded_data();
    assert_eq!(mover.state(), ScanState::Indexed);
    assert_eq!(mover.source().field().unwrap().loaded().pooled_count(), 2);

    mover.prepare_for_model_step(T0, 900.0).unwrap();
    mover.source_mut().dispose_loaded_data();
    assert_eq!(mover.state(), ScanState::Indexed);
    assert_eq!(mover.source().field().unwrap().loaded().pooled_count(), 0);
}

#[test]
fn test_step_optimization_matches_direct_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let path = two_record_current(dir.path());
    let les: Vec<LeRecord> = (0..16)
        .map(|i| LeRecord::surface(-119.9 + 0.05 * i as f64, 30.1 + 0.05 * i as f64, 0.0))
        .collect();

    let mut results = Vec::new();
    for optimize in [false, true] {
        let config = MoverConfig::new(MoverKind::GridCurrent, &path).with_step_optimization(optimize);
        let mut mover = AnyMover::from_config(config).unwrap();
        mover.prepare_for_model_step(T0 + 1234.0, 600.0).unwrap();
        assert_eq!(
            mover.source().field().unwrap().has_blended(),
            optimize
        );
        let mut out = vec![WorldPoint3D::ZERO; les.len()];
        mover.get_moves_parallel(&les, T0 + 1234.0, 600.0, &mut out).unwrap();
        mover.model_step_is_done();
        assert!(!mover.source().field().unwrap().has_blended());
        results.push(out);
    }

    for (a, b) in results[0].iter().zip(&results[1]) {
        assert!((a.p - b.p).length() < 1e-15);
    }
}

/// 3x3 网格（经度 -120..-119，纬度 30..31），两帧为梯度不同的线性场
///
/// 记 a = 经度 + 120, b = 纬度 - 30：第 0 帧 (a, b)，第 1 帧 (2b, -a)。
fn write_ramp_field(dir: &Path) -> PathBuf {
    let mut text = String::from(
        "[GRIDCURTIME] m/s\nNUMROWS 3\nNUMCOLS 3\nLOLAT 30.0\nHILAT 31.0\nLOLONG -120.0\nHILONG -119.0\n",
    );
    for (frame, stamp) in STAMPS[..2].iter().enumerate() {
        text.push_str(&format!("[TIME] {stamp}\n"));
        for row in 1..=3 {
            for col in 1..=3 {
                let a = (col - 1) as f64 * 0.5;
                let b = 1.0 - (row - 1) as f64 * 0.5;
                let (u, v) = if frame == 0 { (a, b) } else { (2.0 * b, -a) };
                text.push_str(&format!("{row} {col} {u} {v}\n"));
            }
        }
    }
    let path = dir.join("ramp.cur");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_time_blend_of_spatially_varying_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_ramp_field(dir.path());
    let points = [
        DVec2::new(-119.85, 30.7),
        DVec2::new(-119.3, 30.15),
        DVec2::new(-119.55, 30.95),
    ];
    let time = T0 + 900.0;
    let f = 0.25;

    for optimize in [false, true] {
        let config = MoverConfig::new(MoverKind::GridCurrent, &path).with_step_optimization(optimize);
        let mut mover = AnyMover::from_config(config).unwrap();
        mover.prepare_for_model_step(time, 900.0).unwrap();
        assert_eq!(mover.source().field().unwrap().has_blended(), optimize);

        for p in points {
            let a = p.x + 120.0;
            let b = p.y - 30.0;
            let expected = DVec2::new(a, b) * (1.0 - f) + DVec2::new(2.0 * b, -a) * f;

            let v = mover.source().velocity_at(p, time).unwrap();
            assert!((v - expected).length() < 1e-9, "optimize={optimize}, p={p}");

            let le = LeRecord::surface(p.x, p.y, 0.0);
            let delta = mover.get_move(&le, time, 900.0).unwrap();
            let moved = meters_to_degrees(expected * 900.0, p.y);
            assert!((delta.p - moved).length() < 1e-12, "optimize={optimize}, p={p}");
        }
        mover.model_step_is_done();
    }
}

#[test]
fn test_wind_uses_windage_and_surface_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_field(
        dir.path(),
        "wind.txt",
        "[GRIDWINDTIME] m/s",
        &[(STAMPS[0], 10.0, 0.0), (STAMPS[1], 10.0, 0.0)],
    );
    let mut mover = AnyMover::from_path(&path).unwrap();
    assert_eq!(mover.class_id(), MoverKind::GridWind);
    mover.prepare_for_model_step(T0, 100.0).unwrap();

    let surface = LeRecord::surface(-119.5, 0.0, 0.03);
    let delta = mover.get_move(&surface, T0, 100.0);
    // 纬度 0 在网格外
    assert_eq!(delta.unwrap_err().kind(), ErrorKind::OffGrid);

    let surface = LeRecord::surface(-119.5, 30.5, 0.03);
    let delta = mover.get_move(&surface, T0, 100.0).unwrap();
    let expected = 10.0 * 0.03 * 100.0 / (METERS_PER_DEGREE_LAT * 30.5_f64.to_radians().cos());
    assert!((delta.p.x - expected).abs() < 1e-12);

    let submerged = surface.with_depth(2.0);
    assert_eq!(mover.get_move(&submerged, T0, 100.0).unwrap(), WorldPoint3D::ZERO);

    let no_windage = LeRecord::surface(-119.5, 30.5, 0.0);
    assert_eq!(mover.get_move(&no_windage, T0, 100.0).unwrap().p, DVec2::ZERO);
}

#[test]
fn test_wind_applies_windage_factor() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_field(
        dir.path(),
        "wind.txt",
        "[GRIDWINDTIME] m/s",
        &[(STAMPS[0], 10.0, 4.0), (STAMPS[1], 10.0, 4.0)],
    );
    let config = MoverConfig::new(MoverKind::GridWind, &path).with_scale(2.0);
    let mut mover = AnyMover::from_config(config).unwrap();
    mover.prepare_for_model_step(T0, 100.0).unwrap();

    let base = LeRecord::surface(-119.5, 30.5, 0.03);
    let full = mover.get_move(&base, T0, 100.0).unwrap();

    let damped = mover.get_move(&base.with_windage_factor(0.5), T0, 100.0).unwrap();
    assert!((damped.p - full.p * 0.5).length() < 1e-15);

    // 扰动因子与预先乘入风漂系数等价
    let folded = mover.get_move(&LeRecord::surface(-119.5, 30.5, 0.015), T0, 100.0).unwrap();
    assert!((damped.p - folded.p).length() < 1e-15);

    let expected = meters_to_degrees(DVec2::new(10.0, 4.0) * 2.0 * 0.03 * 1.5 * 100.0, 30.5);
    let gusty = mover.get_move(&base.with_windage_factor(1.5), T0, 100.0).unwrap();
    assert!((gusty.p - expected).length() < 1e-15);

    let calm = base.with_windage_factor(0.0);
    assert_eq!(mover.get_move(&calm, T0, 100.0).unwrap().p, DVec2::ZERO);
}

#[test]
fn test_record_roundtrip_leaves_unscanned() {
    let dir = tempfile::tempdir().unwrap();
    let path = two_record_current(dir.path());
    let config = MoverConfig::new(MoverKind::GridCurrent, &path)
        .with_name("Bay current")
        .with_units(VelocityUnits::MetersPerSecond)
        .with_scale(1.5)
        .with_extrapolation(true);
    let mut mover = AnyMover::from_config(config.clone()).unwrap();
    mover.prepare_for_model_step(T0, 900.0).unwrap();
    assert_eq!(mover.state(), ScanState::Bracketed);

    let mut bytes = Vec::new();
    mover.write_record(&mut bytes).unwrap();
    let restored = AnyMover::read_record(&mut Cursor::new(bytes)).unwrap();

    assert_eq!(restored.config(), &config);
    assert_eq!(restored.state(), ScanState::Unscanned);
    assert_eq!(restored.class_id(), MoverKind::GridCurrent);
}

#[test]
fn test_update_config_rescan_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = two_record_current(dir.path());
    let config = MoverConfig::new(MoverKind::GridCurrent, &path);
    let mut mover = AnyMover::from_config(config.clone()).unwrap();
    mover.prepare_for_model_step(T0, 900.0).unwrap();

    mover.update_config(config.clone().with_scale(2.0)).unwrap();
    assert_eq!(mover.state(), ScanState::Bracketed);

    mover.update_config(config.clone().with_extrapolation(true)).unwrap();
    assert_eq!(mover.state(), ScanState::Unscanned);

    let wind = MoverConfig::new(MoverKind::GridWind, &path);
    assert!(mover.update_config(wind).is_err());
}

#[test]
fn test_file_list_rescan_when_grown() {
    let dir = tempfile::tempdir().unwrap();
    write_field(dir.path(), "a.cur", "[GRIDCURTIME] m/s", &[(STAMPS[0], 1.0, 0.0), (STAMPS[1], 1.0, 0.0)]);
    write_field(dir.path(), "b.cur", "[GRIDCURTIME] m/s", &[(STAMPS[2], 5.0, 0.0), (STAMPS[3], 5.0, 0.0)]);

    let header = "[GRIDCURTIME] m/s\nNUMROWS 2\nNUMCOLS 2\nLOLAT 30.0\nHILAT 31.0\nLOLONG -120.0\nHILONG -119.0\n";
    let list = dir.path().join("list.cur");
    fs::write(&list, format!("{header}[FILE] a.cur\n")).unwrap();

    let mut mover = AnyMover::from_path(&list).unwrap();
    assert_eq!(mover.file_count(), 1);
    assert_eq!(mover.time_count(), 2);
    mover.prepare_for_model_step(T0, 900.0).unwrap();

    let late = T0 + 2.5 * HOUR;
    assert_eq!(mover.prepare_for_model_step(late, 900.0).unwrap_err().kind(), ErrorKind::TimeRange);

    fs::write(&list, format!("{header}[FILE] a.cur\n[FILE] b.cur\n")).unwrap();
    mover.prepare_for_model_step(late, 900.0).unwrap();
    assert_eq!(mover.file_count(), 2);
    assert_eq!(mover.time_count(), 4);

    let v = mover.velocity_at(inside(), late).unwrap();
    assert!((v.x - 5.0).abs() < 1e-12);

    // 区间跨越两个子文件
    let v = mover.velocity_at(inside(), T0 + 1.5 * HOUR).unwrap();
    assert!((v.x - 3.0).abs() < 1e-12);
}

#[test]
fn test_mover_set_step_moves_particles() {
    let dir = tempfile::tempdir().unwrap();
    let current = two_record_current(dir.path());
    let wind = write_field(
        dir.path(),
        "wind.txt",
        "[GRIDWINDTIME] m/s",
        &[(STAMPS[0], 0.0, 10.0), (STAMPS[1], 0.0, 10.0)],
    );

    let mut set = MoverSet::new();
    set.push(AnyMover::from_path(&current).unwrap());
    set.push(AnyMover::from_path(&wind).unwrap());
    assert_eq!(set.len(), 2);

    let mut les = vec![
        LeRecord::surface(-119.5, 30.5, 0.03),
        LeRecord::surface(-119.5, 30.5, 0.03).with_depth(5.0),
        LeRecord::surface(5.0, 5.0, 0.03),
    ];
    let start = les.clone();

    set.prepare_for_model_run().unwrap();
    set.step(T0, 60.0, &mut les).unwrap();

    // 水面粒子：海流向东 1 m/s，风向北 10 * 0.03 m/s
    let east = 60.0 / (METERS_PER_DEGREE_LAT * 30.5_f64.to_radians().cos());
    let north = 0.3 * 60.0 / METERS_PER_DEGREE_LAT;
    assert!((les[0].position.p.x - (start[0].position.p.x + east)).abs() < 1e-12);
    assert!((les[0].position.p.y - (start[0].position.p.y + north)).abs() < 1e-12);

    // 水下粒子只受海流
    assert!((les[1].position.p.x - (start[1].position.p.x + east)).abs() < 1e-12);
    assert_eq!(les[1].position.p.y, start[1].position.p.y);

    // 网格外粒子不动
    assert_eq!(les[2].position, start[2].position);
}

#[test]
fn test_mover_set_failure_reports_and_keeps_particles() {
    let dir = tempfile::tempdir().unwrap();
    let current = two_record_current(dir.path());

    let mut set = MoverSet::new();
    set.push(AnyMover::from_path(&current).unwrap());

    let mut les = vec![LeRecord::surface(-119.5, 30.5, 0.0)];
    let start = les.clone();

    let failure = set.step(T0 + 5.0 * HOUR, 60.0, &mut les).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::TimeRange);
    assert!(failure.message.starts_with("bay.cur"));
    assert!(failure.message.len() <= MAX_ERROR_MESSAGE_LEN);
    assert_eq!(les, start);

    let missing = MoverConfig::new(MoverKind::GridCurrent, dir.path().join("gone.cur"));
    set.push(AnyMover::from_config(missing).unwrap());
    let failure = set.step(T0, 60.0, &mut les).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::Io);
}
