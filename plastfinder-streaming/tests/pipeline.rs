//! End-to-end tests: upstream fragments through the relay, over a byte
//! stream, into the consumer.

use bytes::Bytes;
use futures::{stream, StreamExt};
use plastfinder_core::{GroundingChunk, GroundingMetadata, SearchCriteria, UpstreamFragment};
use plastfinder_streaming::{
    consume, encode_metadata, relay_all, spawn_relay, RelayConfig, SearchController, SearchState,
    SearchUpdate, StreamDecoder, StreamError, StreamResult, WireLine,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::convert::Infallible;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const UPSTREAM: &str = concat!(
    "{\"factoryName\":\"Embalagens São João\",\"location\":\"Curitiba, PR\",\"minPrice\":0.12}\n",
    "not json\n",
    "{\"location\":\"no name\"}\n",
    "\n",
    "{\"factoryName\":\"Plásticos Ñandú\",\"maxPrice\":\"0,35\"}\n",
    "{\"factoryName\":\"Último\"}",
);

fn decode_all(chunks: &[&[u8]]) -> Vec<WireLine> {
    let mut decoder = StreamDecoder::new();
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(decoder.push_bytes(chunk));
    }
    out.extend(decoder.finish());
    out
}

fn record_names(lines: &[WireLine]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|l| match l {
            WireLine::Record(r) => Some(r.factory_name.clone()),
            WireLine::Metadata(_) => None,
        })
        .collect()
}

fn char_boundaries(text: &str) -> Vec<usize> {
    (0..=text.len()).filter(|&i| text.is_char_boundary(i)).collect()
}

#[test]
fn relay_output_independent_of_fragment_boundaries() {
    let whole: Vec<Bytes> = relay_all(vec![UpstreamFragment::text(UPSTREAM)]);

    for split in char_boundaries(UPSTREAM) {
        let (a, b) = UPSTREAM.split_at(split);
        let parts = relay_all(vec![UpstreamFragment::text(a), UpstreamFragment::text(b)]);
        assert_eq!(parts, whole, "split at byte {split}");
    }
}

#[test]
fn relay_three_way_partitions() {
    let whole = relay_all(vec![UpstreamFragment::text(UPSTREAM)]);
    let bounds = char_boundaries(UPSTREAM);

    for (i, &x) in bounds.iter().enumerate().step_by(7) {
        for &y in bounds[i..].iter().step_by(5) {
            let parts = relay_all(vec![
                UpstreamFragment::text(&UPSTREAM[..x]),
                UpstreamFragment::text(&UPSTREAM[x..y]),
                UpstreamFragment::text(&UPSTREAM[y..]),
            ]);
            assert_eq!(parts, whole, "splits at {x} and {y}");
        }
    }
}

#[test]
fn consumer_tolerates_any_byte_split() {
    let wire: Vec<u8> = relay_all(vec![UpstreamFragment::text(UPSTREAM).with_metadata(
        GroundingMetadata::new(vec![GroundingChunk::web("http://x", "Fonte ç")]),
    )])
    .concat();

    let expected = decode_all(&[wire.as_slice()]);
    assert_eq!(
        record_names(&expected),
        vec!["Embalagens São João", "Plásticos Ñandú", "Último"]
    );
    assert!(matches!(expected.last(), Some(WireLine::Metadata(_))));

    for split in 0..=wire.len() {
        let (a, b) = wire.split_at(split);
        assert_eq!(decode_all(&[a, b]), expected, "split at byte {split}");
    }

    let single_bytes: Vec<&[u8]> = wire.chunks(1).collect();
    assert_eq!(decode_all(&single_bytes), expected);
}

#[test]
fn lenient_fields_survive_the_relay() {
    let wire = relay_all(vec![UpstreamFragment::text(UPSTREAM)]).concat();
    let lines = decode_all(&[wire.as_slice()]);

    let WireLine::Record(record) = &lines[1] else {
        panic!("expected a record");
    };
    assert_eq!(record.max_price, Some(0.35));
}

#[test]
fn metadata_arrives_after_all_records() {
    let fragments = vec![
        UpstreamFragment::text("{\"factoryName\":\"A\",\"location\":\"X\"}\n{\"facto"),
        UpstreamFragment::text("ryName\":\"B\"}").with_metadata(GroundingMetadata::new(vec![
            GroundingChunk::web("http://x", "X"),
        ])),
    ];
    let wire = relay_all(fragments).concat();
    let lines = decode_all(&[wire.as_slice()]);

    assert_eq!(lines.len(), 3);
    assert_eq!(record_names(&lines), vec!["A", "B"]);
    let WireLine::Metadata(metadata) = &lines[2] else {
        panic!("expected metadata last");
    };
    let uris: Vec<_> = metadata.web_sources().map(|s| s.uri.as_str()).collect();
    assert_eq!(uris, vec!["http://x"]);
}

#[rstest]
#[case::garbage_then_record("not json\n{\"factoryName\":\"C\"}\n", vec!["C"])]
#[case::nameless("{\"location\":\"no name\"}\n", vec![])]
#[case::blank_name("{\"factoryName\":\"   \"}\n", vec![])]
#[case::array_line("[1,2,3]\n{\"factoryName\":\"D\"}", vec!["D"])]
#[case::crlf("{\"factoryName\":\"E\"}\r\n", vec!["E"])]
fn dropped_lines_do_not_interrupt(#[case] upstream: &str, #[case] expected: Vec<&str>) {
    let wire = relay_all(vec![UpstreamFragment::text(upstream)]).concat();
    assert_eq!(record_names(&decode_all(&[wire.as_slice()])), expected);
}

fn metadata_line(uri: &str) -> Vec<u8> {
    let metadata = GroundingMetadata::new(vec![GroundingChunk::web(uri, "Fonte ç")]);
    encode_metadata(&metadata).unwrap().to_vec()
}

/// Feed `wire` split at `at` and return the controller plus how many times
/// the metadata slot was replaced.
async fn consume_split(wire: &[u8], at: usize) -> (SearchController, usize) {
    let (a, b) = wire.split_at(at);
    let body = stream::iter(vec![
        Ok::<_, StreamError>(Bytes::copy_from_slice(a)),
        Ok(Bytes::copy_from_slice(b)),
    ]);

    let mut controller = SearchController::new();
    controller.begin(SearchCriteria::default());
    let mut replaced = 0;
    consume(
        &mut controller,
        body,
        &CancellationToken::new(),
        Duration::from_secs(5),
        |_, update| {
            if *update == SearchUpdate::MetadataReplaced {
                replaced += 1;
            }
        },
    )
    .await
    .unwrap();
    (controller, replaced)
}

#[rstest]
#[case::last_valid_wins(
    vec![
        b"{\"factoryName\":\"A\"}\n".to_vec(),
        metadata_line("http://one"),
        b"{\"factoryName\":\"B\"}\n".to_vec(),
        b"__METADATA__:{oops}\n".to_vec(),
        metadata_line("http://two"),
        b"{\"factoryName\":\"C\"}\n".to_vec(),
    ],
    "http://two",
    2,
)]
#[case::malformed_after_valid(
    vec![
        b"{\"factoryName\":\"A\"}\n".to_vec(),
        metadata_line("http://one"),
        b"__METADATA__:{oops}\n".to_vec(),
    ],
    "http://one",
    1,
)]
#[case::truncated_after_valid(
    vec![
        metadata_line("http://one"),
        b"{\"factoryName\":\"A\"}\n".to_vec(),
        b"__METADATA__:{\"groundingChunks\":[".to_vec(),
    ],
    "http://one",
    1,
)]
#[tokio::test]
async fn metadata_slot_holds_last_valid_control_line(
    #[case] lines: Vec<Vec<u8>>,
    #[case] expected_uri: &str,
    #[case] expected_replacements: usize,
) {
    let wire = lines.concat();

    for at in 0..=wire.len() {
        let (controller, replaced) = consume_split(&wire, at).await;

        assert_eq!(controller.state(), SearchState::Done, "split at byte {at}");
        assert_eq!(replaced, expected_replacements, "split at byte {at}");
        let uris: Vec<_> = controller
            .metadata()
            .expect("metadata kept")
            .web_sources()
            .map(|s| s.uri.as_str())
            .collect();
        assert_eq!(uris, vec![expected_uri], "split at byte {at}");
    }
}

#[tokio::test]
async fn spawned_relay_feeds_controller() {
    let upstream = stream::iter(vec![
        Ok::<_, Infallible>(UpstreamFragment::text("{\"factoryName\":\"A\"}\n{\"fac")),
        Ok(UpstreamFragment::text("toryName\":\"B\"}\n")
            .with_metadata(GroundingMetadata::new(vec![GroundingChunk::web("http://s", "S")]))),
    ]);
    let (body, handle) = spawn_relay(upstream, RelayConfig::default());

    let mut controller = SearchController::new();
    controller.begin(SearchCriteria::default());
    let mut seen = Vec::new();
    consume(
        &mut controller,
        body.map(Ok::<_, StreamError>),
        &CancellationToken::new(),
        Duration::from_secs(5),
        |c, _| seen.push(c.results().len()),
    )
    .await
    .unwrap();

    let stats = handle.await.unwrap();
    assert_eq!(stats.records, 2);
    assert!(stats.metadata_emitted);

    assert_eq!(controller.state(), SearchState::Done);
    assert_eq!(controller.results().len(), 2);
    assert!(controller.metadata().is_some());
    assert_eq!(seen, vec![1, 2, 2, 2]);
}

#[tokio::test]
async fn upstream_failure_still_drains() {
    let upstream = stream::iter(vec![
        Ok(UpstreamFragment::text("{\"factoryName\":\"A\"}\n{\"factoryName\":\"B\"}")
            .with_metadata(GroundingMetadata::default())),
        Err("upstream reset"),
        Ok(UpstreamFragment::text("{\"factoryName\":\"C\"}\n")),
    ]);
    let (body, handle) = spawn_relay(upstream, RelayConfig::default());

    let lines: Vec<Bytes> = body.collect().await;
    let chunks: Vec<&[u8]> = lines.iter().map(|b| &b[..]).collect();
    let decoded = decode_all(&chunks);

    assert_eq!(record_names(&decoded), vec!["A", "B"]);
    assert!(matches!(decoded.last(), Some(WireLine::Metadata(_))));
    assert_eq!(handle.await.unwrap().fragments, 1);
}

#[tokio::test(start_paused = true)]
async fn stalled_upstream_drains_after_idle_timeout() {
    let upstream = stream::iter(vec![Ok::<_, Infallible>(UpstreamFragment::text(
        "{\"factoryName\":\"A\"}",
    ))])
    .chain(stream::pending());
    let config = RelayConfig::default().with_idle_timeout(Duration::from_secs(10));
    let (body, handle) = spawn_relay(upstream, config);

    let lines: Vec<Bytes> = body.collect().await;
    assert_eq!(lines.len(), 1);
    assert_eq!(handle.await.unwrap().records, 1);
}

#[tokio::test]
async fn dropped_receiver_stops_relay() {
    let upstream = stream::iter(
        (0..1000).map(|i| Ok::<_, Infallible>(UpstreamFragment::text(format!(
            "{{\"factoryName\":\"F{i}\"}}\n"
        )))),
    );
    let config = RelayConfig {
        channel_capacity: 1,
        ..RelayConfig::default()
    };
    let (body, handle) = spawn_relay(upstream, config);
    drop(body);

    let stats = handle.await.unwrap();
    assert!(stats.records < 1000);
    assert!(!stats.metadata_emitted);
}

#[tokio::test]
async fn cancellation_mid_stream_applies_nothing_further() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let body = stream::iter(vec![
        Ok::<_, StreamError>(Bytes::from_static(b"{\"factoryName\":\"A\"}\n")),
        Ok(Bytes::from_static(b"{\"factoryName\":\"B\"}\n")),
    ]);

    let mut controller = SearchController::new();
    controller.begin(SearchCriteria::default());
    let result: StreamResult<()> = consume(
        &mut controller,
        body,
        &cancel,
        Duration::from_secs(5),
        |c, _| {
            if c.results().len() == 1 {
                trigger.cancel();
            }
        },
    )
    .await;

    assert!(matches!(result, Err(StreamError::Cancelled)));
    assert_eq!(controller.state(), SearchState::Cancelled);
    assert_eq!(record_names_of(&controller), vec!["A"]);
}

fn record_names_of(controller: &SearchController) -> Vec<&str> {
    controller
        .results()
        .iter()
        .map(|r| r.factory_name.as_str())
        .collect()
}
