use proptest::prelude::*;
use tof_pipeline::{
    capture::{CaptureError, FrameSize, MockStreamer, RawFrame, Streamer, ToFRawFrame},
    conversion::SampleField,
    device::{DeviceCall, MockDevice},
    CameraError, CameraState, ConversionError, FrameConverter, FrameRate, StaticCalibration,
    ToFCamera, VideoMode,
};

type MockCamera = ToFCamera<MockDevice, MockStreamer, StaticCalibration>;

fn mode(width: u32, height: u32) -> VideoMode {
    VideoMode {
        frame_size: FrameSize::new(width, height),
        frame_rate: FrameRate::new(30, 1),
    }
}

fn started_camera(streamer: MockStreamer, calibration: StaticCalibration) -> MockCamera {
    let mut camera = ToFCamera::new(MockDevice::new(mode(320, 240)), streamer, calibration);
    camera.init().unwrap();
    camera.start().unwrap();
    camera
}

fn samples(values: &[u32], width: u8) -> Vec<u8> {
    values
        .iter()
        .flat_map(|&v| match width {
            1 => vec![v as u8],
            2 => (v as u16).to_ne_bytes().to_vec(),
            4 => v.to_ne_bytes().to_vec(),
            w => vec![0u8; w as usize],
        })
        .collect()
}

#[test]
fn end_to_end_mixed_word_widths() {
    let streamer = MockStreamer::new(FrameSize::new(320, 240))
        .with_word_widths(2, 1)
        .with_samples(1000, 200);
    let mut camera = started_camera(streamer, StaticCalibration::new(2.0, 0.125));

    let mut slot = None;
    let frame = camera.capture_depth_frame(&mut slot).unwrap();

    assert_eq!(frame.size, FrameSize::new(320, 240));
    assert_eq!(frame.depth.len(), 320 * 240);
    assert_eq!(frame.amplitude.len(), 320 * 240);
    assert!(frame.depth.iter().all(|&d| d == 125.0));
    assert!(frame.amplitude.iter().all(|&a| a == 400.0));
}

#[test]
fn end_to_end_unsupported_phase_width() {
    let streamer = MockStreamer::new(FrameSize::new(320, 240))
        .with_word_widths(2, 2)
        .with_samples(1000, 200);
    let mut camera = started_camera(streamer, StaticCalibration::new(2.0, 0.125));

    let mut slot = None;
    camera.capture_depth_frame(&mut slot).unwrap();
    let before = slot.clone();

    *camera.streamer_mut() = {
        let mut streamer = MockStreamer::new(FrameSize::new(320, 240))
            .with_word_widths(3, 2)
            .with_samples(7, 7);
        streamer.start().unwrap();
        streamer
    };

    let err = camera.capture_depth_frame(&mut slot).unwrap_err();
    match err {
        CameraError::Conversion(ConversionError::UnsupportedWordWidth { field, width }) => {
            assert_eq!(field, SampleField::Phase);
            assert_eq!(field.to_string(), "phase");
            assert_eq!(width, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(slot, before);
    assert_eq!(camera.stats().conversion_failures, 1);
}

#[test]
fn capture_not_ready_never_reaches_streamer() {
    let mut camera: MockCamera = ToFCamera::new(
        MockDevice::new(mode(32, 24)),
        MockStreamer::new(FrameSize::new(32, 24)),
        StaticCalibration::new(1.0, 1.0),
    );

    // Uninitialized, not running
    assert!(matches!(
        camera.capture_raw_frame(),
        Err(CameraError::Capture(CaptureError::NotReady))
    ));

    // Initialized, not running
    camera.init().unwrap();
    assert!(matches!(
        camera.capture_raw_frame(),
        Err(CameraError::Capture(CaptureError::NotReady))
    ));

    // Started then stopped
    camera.start().unwrap();
    camera.stop().unwrap();
    let mut slot = None;
    assert!(matches!(
        camera.capture_depth_frame(&mut slot),
        Err(CameraError::Capture(CaptureError::NotReady))
    ));

    assert_eq!(camera.streamer().capture_calls(), 0);
    assert!(slot.is_none());
}

#[test]
fn non_tof_frames_are_rejected_at_capture() {
    let mut camera = started_camera(
        MockStreamer::new(FrameSize::new(32, 24)),
        StaticCalibration::new(1.0, 1.0),
    );
    camera.streamer_mut().emit_video_frames(true);

    assert!(matches!(
        camera.capture_raw_frame(),
        Err(CameraError::Capture(CaptureError::UnexpectedFrameType(_)))
    ));
}

#[test]
fn start_sequence_respects_failure_asymmetry() {
    let mut camera: MockCamera = ToFCamera::new(
        MockDevice::new(mode(32, 24)),
        MockStreamer::new(FrameSize::new(32, 24)),
        StaticCalibration::new(1.0, 1.0),
    );
    assert!(matches!(camera.start(), Err(CameraError::NotInitialized)));

    camera.init().unwrap();
    camera.device_mut().fail_on(DeviceCall::FrameRate);
    camera.start().unwrap();
    assert_eq!(camera.state(), CameraState::Started);

    let calls = camera.device().calls();
    let tail = &calls[calls.len() - 3..];
    assert_eq!(
        tail,
        &[
            DeviceCall::FrameSize,
            DeviceCall::FrameRate,
            DeviceCall::InitStartParameters
        ]
    );
}

#[test]
fn restart_after_stop_keeps_frame_reuse() {
    let streamer = MockStreamer::new(FrameSize::new(16, 16)).with_samples(8, 4);
    let mut camera = started_camera(streamer, StaticCalibration::new(0.5, 0.5));

    let mut slot = None;
    camera.capture_depth_frame(&mut slot).unwrap();
    camera.stop().unwrap();
    camera.start().unwrap();
    let frame = camera.capture_depth_frame(&mut slot).unwrap();

    assert_eq!(frame.id, 2);
    assert!(frame.depth.iter().all(|&d| d == 4.0));
    assert!(frame.amplitude.iter().all(|&a| a == 2.0));
}

proptest! {
    #[test]
    fn conversion_lengths_match_dimensions(
        width in 1u32..32,
        height in 1u32..32,
        phase_width in prop::sample::select(vec![1u8, 2, 4]),
        amplitude_width in prop::sample::select(vec![1u8, 2, 4]),
    ) {
        let count = (width * height) as usize;
        let values: Vec<u32> = (0..count as u32).map(|i| i % 200).collect();
        let raw = RawFrame::ToF(ToFRawFrame {
            size: FrameSize::new(width, height),
            id: 1,
            timestamp: 0,
            phase: samples(&values, phase_width),
            phase_word_width: phase_width,
            amplitude: samples(&values, amplitude_width),
            amplitude_word_width: amplitude_width,
        });

        let mut converter = FrameConverter::new(StaticCalibration::new(0.5, 0.25));
        let mut slot = None;
        let frame = converter.convert(&raw, &mut slot).unwrap();

        prop_assert_eq!(frame.depth.len(), count);
        prop_assert_eq!(frame.amplitude.len(), count);
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(frame.depth[i], *v as f32 * 0.25);
            prop_assert_eq!(frame.amplitude[i], *v as f32 * 0.5);
        }
    }

    #[test]
    fn unsupported_widths_never_touch_destination(
        bad_width in (0u8..16).prop_filter("unsupported", |w| ![1, 2, 4].contains(w)),
        on_phase in any::<bool>(),
    ) {
        let values = vec![10u32; 16];
        let good = ToFRawFrame {
            size: FrameSize::new(4, 4),
            id: 1,
            timestamp: 0,
            phase: samples(&values, 2),
            phase_word_width: 2,
            amplitude: samples(&values, 2),
            amplitude_word_width: 2,
        };
        let mut bad = good.clone();
        if on_phase {
            bad.phase = samples(&values, bad_width);
            bad.phase_word_width = bad_width;
        } else {
            bad.amplitude = samples(&values, bad_width);
            bad.amplitude_word_width = bad_width;
        }

        let mut converter = FrameConverter::new(StaticCalibration::new(1.0, 1.0));
        let mut slot = None;
        converter.convert_tof(&good, &mut slot).unwrap();
        let before = slot.clone();

        let is_width_error = matches!(
            converter.convert_tof(&bad, &mut slot),
            Err(ConversionError::UnsupportedWordWidth { width, .. }) if width == bad_width
        );
        prop_assert!(is_width_error);
        prop_assert_eq!(slot, before);
    }
}
