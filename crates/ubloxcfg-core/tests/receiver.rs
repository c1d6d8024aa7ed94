mod common;

use common::{
    ack, is_msg, mon_ver_response, nak, payload, quiet_options, MockTransport, StreamingTransport,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use ubloxcfg_core::config::{build_set_batch, ConfigKey, KeyValue, Layers};
use ubloxcfg_core::nmea::make_sentence;
use ubloxcfg_core::receiver::{
    PollRequest, Receiver, ReceiverOptions, ReceiverState, ResetMode, RxError,
};
use ubloxcfg_core::ubx::make_message;

const NAV_PVT: (u8, u8) = (0x01, 0x07);

fn silent(_baud: Option<u32>, _msg: &[u8]) -> Vec<u8> {
    Vec::new()
}

#[test]
fn test_autobaud_first_match() {
    let (transport, handle) = MockTransport::new(Some(9600), |baud, msg| {
        if baud == Some(115200) && is_msg(msg, 0x0a, 0x04) {
            mon_ver_response()
        } else {
            Vec::new()
        }
    });
    let options = ReceiverOptions {
        name: None,
        verbose: false,
        probe_timeout_ms: 50,
        poll_interval_ms: 1,
        ..Default::default()
    };

    let mut rx = Receiver::with_transport(transport, options).unwrap();
    assert_eq!(rx.state(), ReceiverState::Ready);
    assert_eq!(rx.baudrate(), Some(115200));
    assert_eq!(handle.baud_history(), vec![9600, 38400, 115200]);
    assert_eq!(rx.name(), "receiver (NEO-M9N)");
    assert_eq!(rx.get_ver_str().unwrap(), "SPG 5.10 (NEO-M9N, PROTVER 32.01)");
}

#[test]
fn test_autobaud_without_transport_baud_rate() {
    let (transport, handle) = MockTransport::new(None, |_, msg| {
        if is_msg(msg, 0x0a, 0x04) {
            mon_ver_response()
        } else {
            Vec::new()
        }
    });
    let options = ReceiverOptions {
        autobaud: true,
        ..quiet_options()
    };
    let mut rx = Receiver::with_transport(transport, options).unwrap();
    assert_eq!(rx.baudrate(), None);
    assert!(handle.baud_history().is_empty());

    // The probe response is kept
    let msg = rx.get_next_message().unwrap().unwrap();
    assert_eq!(msg.name, "UBX-MON-VER");
}

#[test]
fn test_no_device_responding() {
    let (transport, handle) = MockTransport::new(Some(9600), silent);
    let options = ReceiverOptions {
        autobaud: true,
        ..quiet_options()
    };
    let result = Receiver::with_transport(transport, options);
    assert!(matches!(result, Err(RxError::NoDeviceResponding)));
    assert_eq!(handle.baud_history().len(), 6);
    assert_eq!(handle.writes_of(0x0a, 0x04), 6);
}

#[test]
fn test_poll_attempts() {
    let (transport, handle) = MockTransport::new(None, silent);
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();

    let req = PollRequest::new(NAV_PVT.0, NAV_PVT.1)
        .timeout_ms(20)
        .retries(2);
    match rx.poll_ubx(&req) {
        Err(RxError::Timeout { name, attempts }) => {
            assert_eq!(name, "UBX-NAV-PVT");
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(handle.writes_of(NAV_PVT.0, NAV_PVT.1), 3);

    let req = req.retries(0);
    assert!(rx.poll_ubx(&req).is_err());
    assert_eq!(handle.writes_of(NAV_PVT.0, NAV_PVT.1), 4);
}

#[test]
fn test_poll_keeps_unrelated_messages() {
    let gga = make_sentence("GNGGA,120000.00,,,,,0,00,99.99,,,,,,");
    let gga_response = gga.clone();
    let (transport, _handle) = MockTransport::new(None, move |_, msg| {
        if is_msg(msg, NAV_PVT.0, NAV_PVT.1) {
            let mut response = gga_response.as_bytes().to_vec();
            // too short, ignored
            response.extend(make_message(NAV_PVT.0, NAV_PVT.1, &[0u8; 4]).unwrap());
            response.extend(make_message(NAV_PVT.0, NAV_PVT.1, &[0u8; 92]).unwrap());
            response
        } else {
            Vec::new()
        }
    });
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();

    let req = PollRequest::new(NAV_PVT.0, NAV_PVT.1).min_size(100);
    let resp = rx.poll_ubx(&req).unwrap();
    assert_eq!(resp.size(), 100);

    let first = rx.get_next_message().unwrap().unwrap();
    assert_eq!(first.name, "NMEA-GN-GGA");
    assert_eq!(first.data, gga.as_bytes());
    let second = rx.get_next_message().unwrap().unwrap();
    assert_eq!((second.name.as_str(), second.size()), ("UBX-NAV-PVT", 12));
    assert!(rx.get_next_message().unwrap().is_none());
}

#[test]
fn test_poll_nak() {
    let (transport, handle) = MockTransport::new(None, |_, msg| nak(msg[2], msg[3]));
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();
    let req = PollRequest::new(0x06, 0x8b).retries(3);
    assert!(matches!(
        rx.poll_ubx(&req),
        Err(RxError::NegativeAcknowledged { .. })
    ));
    assert_eq!(handle.writes().len(), 1);
}

#[test]
fn test_poll_times_out_on_busy_link() {
    let gga = make_sentence("GNGGA,092725.00,4717.11399,N,00833.91590,E,1,08,1.01,499.6,M,48.0,M,,");
    let (transport, handle) = StreamingTransport::new(None, gga.into_bytes());
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();

    let start = Instant::now();
    let req = PollRequest::new(NAV_PVT.0, NAV_PVT.1).timeout_ms(50).retries(1);
    assert!(matches!(
        rx.poll_ubx(&req),
        Err(RxError::Timeout { attempts: 2, .. })
    ));
    assert_eq!(handle.writes_of(NAV_PVT.0, NAV_PVT.1), 2);

    let cfg = build_set_batch(&[KeyValue::new(0x10930006, 1)], Layers::RAM).unwrap();
    assert!(matches!(
        rx.send_ubx_cfg(&cfg[0].msg, 50),
        Err(RxError::Timeout { attempts: 1, .. })
    ));
    assert!(start.elapsed() < Duration::from_secs(2));

    // The stream was kept while waiting
    let msg = rx.get_next_message().unwrap().unwrap();
    assert_eq!(msg.name, "NMEA-GN-GGA");
}

#[test]
fn test_autobaud_gives_up_on_line_noise() {
    let (transport, handle) = StreamingTransport::new(Some(9600), vec![0x55; 64]);
    let options = ReceiverOptions {
        autobaud: true,
        probe_timeout_ms: 20,
        ..quiet_options()
    };

    let start = Instant::now();
    let result = Receiver::with_transport(transport, options);
    assert!(matches!(result, Err(RxError::NoDeviceResponding)));
    assert_eq!(handle.baud_history().len(), 6);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_send_ubx_cfg() {
    let (transport, _handle) = MockTransport::new(None, |_, msg| {
        let p = payload(msg);
        match p.get(1) {
            Some(0x01) => ack(msg[2], msg[3]),
            Some(0x02) => nak(msg[2], msg[3]),
            _ => Vec::new(),
        }
    });
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();

    let ram = build_set_batch(&[KeyValue::new(0x10930006, 1)], Layers::RAM).unwrap();
    rx.send_ubx_cfg(&ram[0].msg, 100).unwrap();

    let bbr = build_set_batch(&[KeyValue::new(0x10930006, 1)], Layers::BBR).unwrap();
    match rx.send_ubx_cfg(&bbr[0].msg, 100) {
        Err(RxError::NegativeAcknowledged { name }) => assert_eq!(name, "UBX-CFG-VALSET"),
        other => panic!("unexpected result: {:?}", other),
    }

    let flash = build_set_batch(&[KeyValue::new(0x10930006, 1)], Layers::FLASH).unwrap();
    assert!(matches!(
        rx.send_ubx_cfg(&flash[0].msg, 20),
        Err(RxError::Timeout { attempts: 1, .. })
    ));

    assert!(matches!(rx.send_ubx_cfg(&[0xb5, 0x62], 20), Err(RxError::Frame(_))));
}

#[test]
fn test_apply_config_stops_at_first_failure() {
    let mut count = 0;
    let (transport, handle) = MockTransport::new(None, move |_, msg| {
        count += 1;
        if count == 2 {
            nak(msg[2], msg[3])
        } else {
            ack(msg[2], msg[3])
        }
    });
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();

    let items: Vec<KeyValue> = (0..200u32)
        .map(|i| KeyValue::new(0x2091_0000 + i, 1))
        .collect();
    let chunks = build_set_batch(&items, Layers::RAM).unwrap();
    assert_eq!(chunks.len(), 4);

    assert!(rx.apply_config(&chunks, 100).is_err());
    assert_eq!(handle.writes().len(), 2);
}

#[test]
fn test_reset_factory() {
    let (transport, handle) = MockTransport::new(None, |_, msg| {
        if is_msg(msg, 0x06, 0x09) {
            ack(0x06, 0x09)
        } else {
            Vec::new()
        }
    });
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();
    rx.reset(ResetMode::Factory).unwrap();

    let writes = handle.writes();
    assert_eq!(writes.len(), 2);
    assert!(is_msg(&writes[0], 0x06, 0x09));
    assert_eq!(
        payload(&writes[0]),
        &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0x03][..]
    );
    assert!(is_msg(&writes[1], 0x06, 0x04));
    assert_eq!(payload(&writes[1]), &[0xff, 0xff, 0x04, 0x00][..]);
}

#[test]
fn test_reset_does_not_wait() {
    let (transport, handle) = MockTransport::new(None, silent);
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();
    rx.reset(ResetMode::Warm).unwrap();
    rx.reset(ResetMode::GnssStop).unwrap();

    let writes = handle.writes();
    assert_eq!(payload(&writes[0]), &[0x01, 0x00, 0x01, 0x00][..]);
    assert_eq!(payload(&writes[1]), &[0x00, 0x00, 0x08, 0x00][..]);
}

#[test]
fn test_get_config() {
    let (transport, handle) = MockTransport::new(None, |_, msg| {
        if !is_msg(msg, 0x06, 0x8b) {
            return Vec::new();
        }
        let response = [
            0x01, 0x00, 0x00, 0x00, // version, RAM, position
            0x06, 0x00, 0x93, 0x10, 0x01, // CFG-NMEA-HIGHPREC
            0x01, 0x00, 0x52, 0x40, 0x00, 0xc2, 0x01, 0x00, // CFG-UART1-BAUDRATE
        ];
        make_message(0x06, 0x8b, &response).unwrap()
    });
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();

    let items = rx
        .get_config(Layers::RAM, &[ConfigKey(0x10930006), ConfigKey(0x40520001)])
        .unwrap();
    assert_eq!(
        items,
        vec![KeyValue::new(0x10930006, 1), KeyValue::new(0x40520001, 115200)]
    );
    assert_eq!(
        payload(&handle.writes()[0]),
        &[0x00, 0x00, 0x00, 0x00, 0x06, 0x00, 0x93, 0x10, 0x01, 0x00, 0x52, 0x40][..]
    );
}

#[test]
fn test_get_config_empty_layer() {
    let (transport, _handle) = MockTransport::new(None, |_, msg| nak(msg[2], msg[3]));
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();
    let items = rx.get_config(Layers::FLASH, &[ConfigKey::ALL_WILDCARD]).unwrap();
    assert!(items.is_empty());
}

#[test]
fn test_get_next_message_timeout() {
    let (transport, handle) = MockTransport::new(None, silent);
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();
    assert!(rx
        .get_next_message_timeout(Duration::from_millis(10))
        .unwrap()
        .is_none());

    handle.inject(b"$GNTXT,01,01,04,hello*37\r\n");
    let msg = rx
        .get_next_message_timeout(Duration::from_millis(100))
        .unwrap()
        .unwrap();
    assert_eq!(msg.name, "NMEA-GN-TXT");
    assert_eq!(rx.stats().nmea_msgs, 1);
}

#[test]
fn test_abort() {
    let (transport, _handle) = MockTransport::new(None, silent);
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();
    rx.abort_handle().abort();
    let req = PollRequest::new(NAV_PVT.0, NAV_PVT.1).timeout_ms(5000);
    assert!(matches!(rx.poll_ubx(&req), Err(RxError::Aborted)));
    assert_eq!(rx.state(), ReceiverState::Ready);
}

#[test]
fn test_transport_failure_closes_session() {
    let (transport, handle) = MockTransport::new(None, silent);
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();
    handle.fail_io();
    assert!(matches!(
        rx.send(&[0x00]),
        Err(RxError::TransportFailure(_))
    ));
    assert_eq!(rx.state(), ReceiverState::Closed);
    assert!(matches!(
        rx.poll_ubx(&PollRequest::new(NAV_PVT.0, NAV_PVT.1)),
        Err(RxError::InvalidState { .. })
    ));
}

#[test]
fn test_close() {
    let (transport, _handle) = MockTransport::new(Some(38400), silent);
    let mut rx = Receiver::with_transport(transport, quiet_options()).unwrap();
    assert_eq!(rx.baudrate(), Some(38400));
    rx.close();
    rx.close();
    assert_eq!(rx.state(), ReceiverState::Closed);
    assert_eq!(rx.baudrate(), None);
    assert!(rx.get_next_message().is_err());
}
