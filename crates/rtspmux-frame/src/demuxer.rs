use bytes::Bytes;

use crate::accumulator::Accumulator;
use crate::config::DemuxConfig;
use crate::control;
use crate::error::{DemuxError, Result};
use crate::interleaved::{self, InterleavedHeader};
use crate::message::Message;
use crate::mode::{self, Mode};

/// Outcome of one extractor run.
#[derive(Debug)]
pub(crate) enum Extraction {
    /// Not enough bytes buffered for a whole unit.
    Incomplete,
    /// A unit was consumed. May be empty for an odd-channel frame without
    /// payload.
    Consumed(Vec<Message>),
}

/// Incremental demultiplexer for one control connection.
///
/// Feed it bytes in whatever chunks the transport delivers; each call
/// returns every message that became complete, in stream order. An empty
/// result means more data is needed.
///
/// One instance belongs to exactly one byte stream. After `feed` returns an
/// error the instance is poisoned and rejects further input; messages
/// extracted earlier in that same call are dropped with the error.
#[derive(Debug)]
pub struct Demuxer {
    backlog: Accumulator,
    mode: Mode,
    pending: Option<InterleavedHeader>,
    config: DemuxConfig,
    poisoned: bool,
}

impl Default for Demuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl Demuxer {
    /// Create a demuxer with default limits.
    pub fn new() -> Self {
        Self::with_config(DemuxConfig::default())
    }

    /// Create a demuxer with explicit limits.
    pub fn with_config(config: DemuxConfig) -> Self {
        Self {
            backlog: Accumulator::new(),
            mode: Mode::Idle,
            pending: None,
            config,
            poisoned: false,
        }
    }

    /// Append a chunk and return every message it completes.
    pub fn feed(&mut self, chunk: impl Into<Bytes>) -> Result<Vec<Message>> {
        if self.poisoned {
            return Err(DemuxError::Poisoned);
        }

        self.backlog.push(chunk.into());
        self.drain().inspect_err(|err| {
            tracing::warn!(error = %err, buffered = self.backlog.len(), "demuxer poisoned");
            self.poisoned = true;
        })
    }

    fn drain(&mut self) -> Result<Vec<Message>> {
        if self.mode == Mode::Idle {
            self.mode = self.detect()?;
        }

        let mut out = Vec::new();
        loop {
            let extraction = match self.mode {
                Mode::Idle => break,
                Mode::Binary => interleaved::extract(&mut self.backlog, &mut self.pending)?,
                Mode::Control => control::extract(&mut self.backlog, &self.config)?,
            };

            let Extraction::Consumed(messages) = extraction else {
                break;
            };
            out.extend(messages);

            let next = self.detect()?;
            if next != self.mode {
                tracing::debug!(from = ?self.mode, to = ?next, "mode changed");
            }
            self.mode = next;
        }

        Ok(out)
    }

    fn detect(&self) -> Result<Mode> {
        mode::detect(&self.backlog, self.config.accept_server_requests)
    }

    /// Current extractor mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Bytes buffered but not yet part of an emitted message.
    pub fn buffered_len(&self) -> usize {
        self.backlog.len()
    }

    /// True while an interleaved header is parsed but its payload is not
    /// fully buffered.
    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// True once a fatal error has been returned.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use rtspmux_payload::ReportBody;

    use super::*;
    use crate::test_support::{
        describe_response, frame, options_response, receiver_report, sender_report,
        session_stream, SDP,
    };

    fn feed_all(demuxer: &mut Demuxer, chunks: &[&[u8]]) -> Vec<Message> {
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(demuxer.feed(Bytes::copy_from_slice(chunk)).unwrap());
        }
        out
    }

    fn whole(stream: &[u8]) -> Vec<Message> {
        Demuxer::new().feed(Bytes::copy_from_slice(stream)).unwrap()
    }

    #[test]
    fn session_stream_in_one_chunk() {
        let messages = whole(&session_stream());
        let kinds: Vec<_> = messages.iter().map(Message::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "control",
                "control",
                "session-description",
                "control",
                "media",
                "media",
                "report",
                "report",
                "control",
                "media",
                "report",
            ]
        );
    }

    #[test]
    fn chunking_invariance_one_byte_at_a_time() {
        let stream = session_stream();
        let expected = whole(&stream);

        let mut demuxer = Demuxer::new();
        let chunks: Vec<&[u8]> = stream.chunks(1).collect();
        assert_eq!(feed_all(&mut demuxer, &chunks), expected);
        assert_eq!(demuxer.buffered_len(), 0);
    }

    #[test]
    fn chunking_invariance_across_split_sizes() {
        let stream = session_stream();
        let expected = whole(&stream);

        for size in [2, 3, 4, 5, 7, 13, 64, 127, stream.len()] {
            let mut demuxer = Demuxer::new();
            let chunks: Vec<&[u8]> = stream.chunks(size).collect();
            assert_eq!(feed_all(&mut demuxer, &chunks), expected, "chunk size {size}");
        }
    }

    #[test]
    fn chunking_invariance_at_every_single_split_point() {
        let stream = session_stream();
        let expected = whole(&stream);

        for split in 0..=stream.len() {
            let mut demuxer = Demuxer::new();
            let (a, b) = stream.split_at(split);
            assert_eq!(feed_all(&mut demuxer, &[a, b]), expected, "split at {split}");
        }
    }

    #[test]
    fn empty_chunk_is_a_no_op() {
        let mut demuxer = Demuxer::new();
        assert!(demuxer.feed(Bytes::new()).unwrap().is_empty());
        assert_eq!(demuxer.mode(), Mode::Idle);

        let wire = options_response(1);
        assert!(demuxer.feed(wire[..10].to_vec()).unwrap().is_empty());
        assert!(demuxer.feed(Bytes::new()).unwrap().is_empty());
        assert_eq!(demuxer.buffered_len(), 10);

        let messages = demuxer.feed(wire[10..].to_vec()).unwrap();
        assert_eq!(messages, vec![Message::Control(Bytes::from(wire))]);
        assert!(demuxer.feed(Bytes::new()).unwrap().is_empty());
    }

    #[test]
    fn control_round_trip_with_body() {
        let wire = describe_response(2, SDP);
        let messages = whole(&wire);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::Control(Bytes::from(wire)));
        assert!(matches!(messages[1], Message::SessionDescription(ref sdp) if sdp.media.len() == 1));
    }

    #[test]
    fn header_only_then_frame_in_later_chunks() {
        let header = options_response(1);
        let wire = frame(0, b"payload");
        let mut demuxer = Demuxer::new();

        let first = demuxer.feed(header.clone()).unwrap();
        assert_eq!(first, vec![Message::Control(Bytes::from(header))]);
        assert_eq!(demuxer.mode(), Mode::Idle);

        assert!(demuxer.feed(wire[..5].to_vec()).unwrap().is_empty());
        assert_eq!(demuxer.mode(), Mode::Binary);
        assert!(demuxer.has_pending_frame());

        let second = demuxer.feed(wire[5..].to_vec()).unwrap();
        assert_eq!(
            second,
            vec![Message::Media {
                channel: 0,
                payload: Bytes::from_static(b"payload"),
            }]
        );
        assert!(!demuxer.has_pending_frame());
    }

    #[test]
    fn header_only_then_frame_in_same_chunk() {
        let mut wire = options_response(1);
        let header_len = wire.len();
        wire.extend(frame(0, b"payload"));

        let messages = whole(&wire);
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            Message::Control(Bytes::copy_from_slice(&wire[..header_len]))
        );
        assert_eq!(messages[1].channel(), Some(0));
    }

    #[test]
    fn back_to_back_header_only_messages_stay_separate() {
        let mut wire = options_response(1);
        wire.extend(options_response(2));

        let messages = whole(&wire);
        assert_eq!(
            messages,
            vec![
                Message::Control(Bytes::from(options_response(1))),
                Message::Control(Bytes::from(options_response(2))),
            ]
        );
    }

    #[test]
    fn even_channel_consumes_exactly_one_frame() {
        let payload = vec![0x5A; 300];
        let mut wire = frame(0, &payload);
        wire.extend_from_slice(b"RTS");

        let mut demuxer = Demuxer::new();
        let messages = demuxer.feed(wire).unwrap();
        assert_eq!(
            messages,
            vec![Message::Media {
                channel: 0,
                payload: Bytes::from(payload),
            }]
        );
        assert_eq!(demuxer.buffered_len(), 3);
        assert_eq!(demuxer.mode(), Mode::Idle);
    }

    #[test]
    fn compound_report_yields_two_messages() {
        let mut compound = sender_report(1, 2);
        compound.extend(receiver_report(3));

        let messages = whole(&frame(1, &compound));
        assert_eq!(messages.len(), 2);
        for message in &messages {
            assert_eq!(message.channel(), Some(1));
        }
        assert!(matches!(
            messages[0],
            Message::Report { ref packet, .. } if matches!(packet.body, ReportBody::SenderReport { ssrc: 1, .. })
        ));
        assert!(matches!(
            messages[1],
            Message::Report { ref packet, .. } if matches!(packet.body, ReportBody::ReceiverReport { ssrc: 3, .. })
        ));
    }

    #[test]
    fn empty_report_frame_does_not_stall() {
        let mut wire = frame(1, b"");
        wire.extend(frame(0, b"after"));

        let messages = whole(&wire);
        assert_eq!(
            messages,
            vec![Message::Media {
                channel: 0,
                payload: Bytes::from_static(b"after"),
            }]
        );
    }

    #[test]
    fn parameter_reply_body_does_not_poison() {
        let reply: &[u8] = b"RTSP/1.0 200 OK\r\nCSeq: 5\r\nContent-Type: text/parameters\r\nContent-Length: 11\r\n\r\nposition: 0";
        let mut wire = reply.to_vec();
        wire.extend(frame(0, b"after"));

        let expected = whole(&wire);
        assert_eq!(expected.len(), 3);
        assert_eq!(expected[0], Message::Control(Bytes::from_static(reply)));
        assert!(matches!(
            expected[1],
            Message::SessionDescription(ref body) if body.unparsed == ["position: 0"]
        ));
        assert_eq!(
            expected[2],
            Message::Media {
                channel: 0,
                payload: Bytes::from_static(b"after"),
            }
        );

        let mut demuxer = Demuxer::new();
        let chunks: Vec<&[u8]> = wire.chunks(1).collect();
        assert_eq!(feed_all(&mut demuxer, &chunks), expected);
        assert!(!demuxer.is_poisoned());
        assert_eq!(demuxer.buffered_len(), 0);
    }

    #[test]
    fn desync_is_fatal_and_poisons() {
        let mut demuxer = Demuxer::new();
        let err = demuxer.feed(b"GARBAGE".to_vec()).unwrap_err();
        assert!(matches!(err, DemuxError::UnrecognizedFraming { .. }));
        assert!(err.is_fatal());
        assert!(demuxer.is_poisoned());

        let err = demuxer.feed(options_response(1)).unwrap_err();
        assert!(matches!(err, DemuxError::Poisoned));
    }

    #[test]
    fn desync_after_valid_message_discards_the_call() {
        let mut wire = options_response(1);
        wire.extend_from_slice(b"\x00\x01garbage");

        let mut demuxer = Demuxer::new();
        let err = demuxer.feed(wire).unwrap_err();
        assert!(matches!(
            err,
            DemuxError::UnrecognizedFraming { ref prefix } if prefix == b"\x00\x01ga"
        ));
        assert!(demuxer.is_poisoned());
    }

    #[test]
    fn desync_after_delivered_message_is_reported_next_call() {
        let mut demuxer = Demuxer::new();
        let messages = demuxer.feed(options_response(1)).unwrap();
        assert_eq!(messages.len(), 1);

        assert!(demuxer.feed(b"X".to_vec()).is_err());
        assert!(matches!(
            demuxer.feed(Bytes::new()),
            Err(DemuxError::Poisoned)
        ));
    }

    #[test]
    fn server_requests_when_enabled() {
        let request = b"SET_PARAMETER rtsp://cam/ RTSP/1.0\r\nCSeq: 7\r\n\r\n".to_vec();

        let mut strict = Demuxer::new();
        assert!(strict.feed(request.clone()).is_err());

        let mut lenient = Demuxer::with_config(DemuxConfig {
            accept_server_requests: true,
            ..DemuxConfig::default()
        });
        let chunks: Vec<&[u8]> = request.chunks(1).collect();
        assert_eq!(
            feed_all(&mut lenient, &chunks),
            vec![Message::Control(Bytes::from(request.clone()))]
        );
    }

    #[test]
    fn malformed_compound_packet_is_fatal() {
        let mut report = receiver_report(1);
        report[3] = 0xFF;
        let mut demuxer = Demuxer::new();
        let err = demuxer.feed(frame(1, &report)).unwrap_err();
        assert!(matches!(err, DemuxError::MalformedCompoundPacket { .. }));
        assert!(demuxer.is_poisoned());
    }

    #[test]
    fn demuxer_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Demuxer>();
    }
}
