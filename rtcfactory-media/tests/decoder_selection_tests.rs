//! Integration tests for decoder selection
//!
//! These tests drive the blacklisted decoder factory with scripted backing
//! factories and in-memory codec registries.

use rtcfactory_media::error::{MediaError, MediaResult};
use rtcfactory_media::frames::{EncodedImage, VideoFrame};
use rtcfactory_media::video::{
    BlacklistPredicate, BlacklistedVideoDecoderFactory, CodecCandidate, DecoderSettings,
    MediaCodecInfo, MediaCodecList, MediaCodecVideoDecoderFactory, PlatformDecoderProvider,
    StaticCodecList, VideoCodecInfo, VideoCodecMimeType, VideoDecoder, VideoDecoderFactory,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// TEST DOUBLES
// ============================================================================

#[derive(Debug)]
struct NamedDecoder {
    name: String,
    fail_decode: bool,
}

impl VideoDecoder for NamedDecoder {
    fn init_decode(&mut self, _settings: &DecoderSettings) -> MediaResult<()> {
        Ok(())
    }

    fn decode(&mut self, image: &EncodedImage) -> MediaResult<Option<VideoFrame>> {
        if self.fail_decode {
            return Err(MediaError::DecodingFailed {
                codec: "VP9".to_string(),
                reason: "hardware fault".to_string(),
            });
        }
        Ok(Some(VideoFrame::black(2, 2, image.timestamp_us)))
    }

    fn release(&mut self) -> MediaResult<()> {
        Ok(())
    }

    fn implementation_name(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug)]
struct ScriptedFactory {
    name: &'static str,
    available: bool,
    fail_decode: bool,
    codecs: Vec<VideoCodecInfo>,
    created: AtomicUsize,
}

impl ScriptedFactory {
    fn new(name: &'static str, available: bool) -> Self {
        Self {
            name,
            available,
            fail_decode: false,
            codecs: Vec::new(),
            created: AtomicUsize::new(0),
        }
    }

    fn failing(mut self) -> Self {
        self.fail_decode = true;
        self
    }

    fn advertising(mut self, names: &[&str]) -> Self {
        self.codecs = names.iter().map(|name| VideoCodecInfo::new(*name)).collect();
        self
    }
}

impl VideoDecoderFactory for ScriptedFactory {
    fn create_decoder(&self, _codec: &VideoCodecInfo) -> Option<Box<dyn VideoDecoder>> {
        if !self.available {
            return None;
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Some(Box::new(NamedDecoder {
            name: self.name.to_string(),
            fail_decode: self.fail_decode,
        }))
    }

    fn supported_codecs(&self) -> Vec<VideoCodecInfo> {
        self.codecs.clone()
    }
}

#[derive(Debug)]
struct FlakyCodecList {
    entries: Vec<Option<MediaCodecInfo>>,
}

impl MediaCodecList for FlakyCodecList {
    fn codec_count(&self) -> usize {
        self.entries.len()
    }

    fn codec_info_at(&self, index: usize) -> MediaResult<MediaCodecInfo> {
        match self.entries.get(index) {
            Some(Some(info)) => Ok(info.clone()),
            _ => Err(MediaError::CodecLookupFailed {
                index,
                reason: "IllegalArgumentException".to_string(),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct RecordingProvider {
    requested: Mutex<Vec<String>>,
}

impl PlatformDecoderProvider for RecordingProvider {
    fn create_decoder(&self, codec_name: &str, _ty: VideoCodecMimeType) -> Option<Box<dyn VideoDecoder>> {
        self.requested.lock().push(codec_name.to_string());
        Some(Box::new(NamedDecoder {
            name: codec_name.to_string(),
            fail_decode: false,
        }))
    }
}

fn exynos_vp9_list() -> Arc<dyn MediaCodecList> {
    Arc::new(StaticCodecList::new(vec![MediaCodecInfo::decoder(
        "OMX.Exynos.vp9.decoder",
        &[VideoCodecMimeType::VP9],
    )]))
}

fn factory_with(
    list: Arc<dyn MediaCodecList>,
    hardware: ScriptedFactory,
    software: ScriptedFactory,
    platform_software: ScriptedFactory,
) -> BlacklistedVideoDecoderFactory {
    BlacklistedVideoDecoderFactory::builder(list)
        .hardware(Arc::new(hardware))
        .software(Arc::new(software))
        .platform_software(Arc::new(platform_software))
        .build()
}

fn is_fallback_composite(decoder: &dyn VideoDecoder) -> bool {
    format!("{:?}", decoder).starts_with("VideoDecoderFallback")
}

// ============================================================================
// BLACKLIST TESTS
// ============================================================================

#[test]
fn test_exynos_vp9_returns_software_decoder() {
    let factory = factory_with(
        exynos_vp9_list(),
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", true),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP9")).unwrap();
    assert_eq!(decoder.implementation_name(), "software");
    assert!(!is_fallback_composite(decoder.as_ref()));
}

#[test]
fn test_blacklisted_without_software_returns_none() {
    let factory = factory_with(
        exynos_vp9_list(),
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", false),
        ScriptedFactory::new("platform-software", false),
    );

    assert!(factory.create_decoder(&VideoCodecInfo::new("vp9")).is_none());
}

#[test]
fn test_blacklisted_uses_platform_software_second() {
    let factory = factory_with(
        exynos_vp9_list(),
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", false),
        ScriptedFactory::new("platform-software", true),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP9")).unwrap();
    assert_eq!(decoder.implementation_name(), "platform-software");
}

#[test]
fn test_exynos_vp8_is_not_blacklisted() {
    let list: Arc<dyn MediaCodecList> = Arc::new(StaticCodecList::new(vec![MediaCodecInfo::decoder(
        "OMX.Exynos.vp8.decoder",
        &[VideoCodecMimeType::VP8],
    )]));
    let factory = factory_with(
        list,
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", true),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP8")).unwrap();
    assert!(is_fallback_composite(decoder.as_ref()));
    assert_eq!(decoder.implementation_name(), "hardware");
}

#[test]
fn test_custom_predicate_is_anded_with_default() {
    let list: Arc<dyn MediaCodecList> = Arc::new(StaticCodecList::new(vec![MediaCodecInfo::decoder(
        "OMX.qcom.video.decoder.vp9",
        &[VideoCodecMimeType::VP9],
    )]));
    let always = BlacklistPredicate::new("always", |_candidate: CodecCandidate<'_>| true);
    let factory = BlacklistedVideoDecoderFactory::builder(list)
        .hardware(Arc::new(ScriptedFactory::new("hardware", true)))
        .software(Arc::new(ScriptedFactory::new("software", true)))
        .predicate(Some(always))
        .build();

    // The default Exynos rule does not match a Qualcomm decoder.
    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP9")).unwrap();
    assert!(is_fallback_composite(decoder.as_ref()));
    assert!(factory.predicate().label().contains("always"));
}

// ============================================================================
// SELECTION TESTS
// ============================================================================

#[test]
fn test_no_candidate_with_both_factories_returns_fallback() {
    let empty: Arc<dyn MediaCodecList> = Arc::new(StaticCodecList::default());
    let factory = factory_with(
        empty,
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", true),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("H264")).unwrap();
    assert!(is_fallback_composite(decoder.as_ref()));
}

#[test]
fn test_unknown_codec_name_is_absent_candidate() {
    let factory = factory_with(
        exynos_vp9_list(),
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", false),
        ScriptedFactory::new("platform-software", false),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("MPEG2")).unwrap();
    assert_eq!(decoder.implementation_name(), "hardware");
}

#[test]
fn test_only_software_available() {
    let factory = factory_with(
        Arc::new(StaticCodecList::default()),
        ScriptedFactory::new("hardware", false),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", true),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP8")).unwrap();
    assert_eq!(decoder.implementation_name(), "software");
}

#[test]
fn test_nothing_available_returns_none() {
    let factory = factory_with(
        Arc::new(StaticCodecList::default()),
        ScriptedFactory::new("hardware", false),
        ScriptedFactory::new("software", false),
        ScriptedFactory::new("platform-software", false),
    );

    assert!(factory.create_decoder(&VideoCodecInfo::new("AV1")).is_none());
}

#[test]
fn test_backing_factories_are_queried_independently() {
    let hardware = Arc::new(ScriptedFactory::new("hardware", true));
    let software = Arc::new(ScriptedFactory::new("software", true));
    let factory = BlacklistedVideoDecoderFactory::builder(exynos_vp9_list())
        .hardware(hardware.clone())
        .software(software.clone())
        .build();

    factory.create_decoder(&VideoCodecInfo::new("VP9"));
    assert_eq!(hardware.created.load(Ordering::SeqCst), 1);
    assert_eq!(software.created.load(Ordering::SeqCst), 1);
}

#[test]
fn test_enumeration_failures_are_skipped() {
    let list: Arc<dyn MediaCodecList> = Arc::new(FlakyCodecList {
        entries: vec![
            None,
            Some(MediaCodecInfo::decoder("OMX.Exynos.vp9.decoder", &[VideoCodecMimeType::VP9])),
        ],
    });
    let factory = factory_with(
        list,
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", false),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP9")).unwrap();
    assert_eq!(decoder.implementation_name(), "software");
}

#[test]
fn test_first_match_not_best() {
    let list = StaticCodecList::new(vec![
        MediaCodecInfo::decoder("OMX.qcom.video.decoder.vp9", &[VideoCodecMimeType::VP9]),
        MediaCodecInfo::decoder("OMX.Exynos.vp9.decoder", &[VideoCodecMimeType::VP9]),
    ]);
    let factory = factory_with(
        Arc::new(list),
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", true),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP9")).unwrap();
    assert!(is_fallback_composite(decoder.as_ref()));
}

#[test]
fn test_encoders_are_not_candidates() {
    let list = StaticCodecList::new(vec![MediaCodecInfo::encoder(
        "OMX.Exynos.vp9.encoder",
        &[VideoCodecMimeType::VP9],
    )]);
    let factory = factory_with(
        Arc::new(list),
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", true),
    );

    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP9")).unwrap();
    assert!(is_fallback_composite(decoder.as_ref()));
}

// ============================================================================
// FALLBACK TESTS
// ============================================================================

#[test]
fn test_composite_switches_to_software_on_hardware_error() {
    let factory = factory_with(
        Arc::new(StaticCodecList::default()),
        ScriptedFactory::new("hardware", true).failing(),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", false),
    );

    let mut decoder = factory.create_decoder(&VideoCodecInfo::new("VP8")).unwrap();
    decoder.init_decode(&DecoderSettings::default()).unwrap();
    let image = EncodedImage::new(vec![1, 2, 3], 40, true);
    let frame = decoder.decode(&image).unwrap().unwrap();
    assert_eq!(frame.timestamp_us, 40);
    assert_eq!(decoder.implementation_name(), "fallback:software");
}

// ============================================================================
// SUPPORTED CODECS TESTS
// ============================================================================

#[test]
fn test_supported_codecs_is_concatenation() {
    let factory = factory_with(
        Arc::new(StaticCodecList::default()),
        ScriptedFactory::new("hardware", true).advertising(&["VP8", "VP9", "H264"]),
        ScriptedFactory::new("software", true).advertising(&["H264", "VP8"]),
        ScriptedFactory::new("platform-software", true).advertising(&["AV1"]),
    );

    let names: Vec<String> = factory
        .supported_codecs()
        .into_iter()
        .map(|codec| codec.name)
        .collect();
    assert_eq!(names.len(), 6);
    assert_eq!(names, vec!["H264", "VP8", "VP8", "VP9", "H264", "AV1"]);
}

// ============================================================================
// PLATFORM FACTORY TESTS
// ============================================================================

#[test]
fn test_platform_factories_split_hardware_and_software() {
    let list: Arc<dyn MediaCodecList> = Arc::new(StaticCodecList::new(vec![
        MediaCodecInfo::decoder("OMX.google.vp8.decoder", &[VideoCodecMimeType::VP8]),
        MediaCodecInfo::decoder("OMX.qcom.video.decoder.vp8", &[VideoCodecMimeType::VP8]),
    ]));
    let provider = Arc::new(RecordingProvider::default());

    let hardware = MediaCodecVideoDecoderFactory::hardware(list.clone(), provider.clone());
    let software = MediaCodecVideoDecoderFactory::platform_software(list, provider.clone());

    let hw = hardware.create_decoder(&VideoCodecInfo::new("VP8")).unwrap();
    let sw = software.create_decoder(&VideoCodecInfo::new("VP8")).unwrap();
    assert_eq!(hw.implementation_name(), "OMX.qcom.video.decoder.vp8");
    assert_eq!(sw.implementation_name(), "OMX.google.vp8.decoder");
    assert_eq!(provider.requested.lock().len(), 2);

    let advertised = hardware.supported_codecs();
    assert_eq!(advertised.len(), 1);
    assert!(advertised[0].is_named("vp8"));
}

#[test]
fn test_default_factory_blacklists_exynos_platform_decoder() {
    let provider = Arc::new(RecordingProvider::default());
    let factory = BlacklistedVideoDecoderFactory::new(exynos_vp9_list(), provider.clone());

    // No built-in or platform software VP9 decoder exists here.
    assert!(factory.create_decoder(&VideoCodecInfo::new("VP9")).is_none());
    assert!(provider
        .requested
        .lock()
        .iter()
        .all(|name| name == "OMX.Exynos.vp9.decoder"));
}

#[test]
fn test_device_profile_from_json() {
    let profile = r#"[
        {
            "name": "OMX.Exynos.vp9.decoder",
            "supported_types": ["video/x-vnd.on2.vp9"],
            "capabilities": {
                "video/x-vnd.on2.vp9": { "color_formats": [2141391872] }
            }
        },
        {
            "name": "OMX.Exynos.vp9.encoder",
            "is_encoder": true,
            "supported_types": ["video/x-vnd.on2.vp9"]
        }
    ]"#;
    let list: StaticCodecList = serde_json::from_str(profile).unwrap();
    assert_eq!(list.codecs().len(), 2);
    assert!(!list.codecs()[0].is_encoder);

    let factory = factory_with(
        Arc::new(list),
        ScriptedFactory::new("hardware", true),
        ScriptedFactory::new("software", true),
        ScriptedFactory::new("platform-software", false),
    );
    let decoder = factory.create_decoder(&VideoCodecInfo::new("VP9")).unwrap();
    assert_eq!(decoder.implementation_name(), "software");
}
