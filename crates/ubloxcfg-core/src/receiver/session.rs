//! Receiver session

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use super::{
    PollRequest, ReceiverOptions, ResetMode, RxError, Target, Transport, AUTOBAUD_RATES,
    DEFAULT_TIMEOUT_MS, MAX_INTAKE,
};
use crate::config::{
    build_valget_poll, parse_valget_response, ConfigChunk, ConfigKey, KeyValue, Layers,
    VALGET_MAX_K,
};
use crate::parser::{Parser, ParserMsg, ParserStats};
use crate::ubx::messages::{
    cfg_cfg, cfg_rst, MonVer, CFG_CFG_DEVICE_BBR, CFG_CFG_DEVICE_FLASH, CFG_CFG_MASK_ALL,
    CFG_CFG_MASK_NONE,
};
use crate::ubx::{
    make_message, message_name, UbxFrame, UBX_ACK_ACK_MSGID, UBX_ACK_CLSID, UBX_ACK_NAK_MSGID,
    UBX_FRAME_SIZE, UBX_MON_CLSID, UBX_MON_VER_MSGID,
};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiverState {
    /// No transport
    Closed,
    /// Transport open, receiver not (yet) found
    Open,
    /// Searching for the baud rate
    BaudProbing,
    /// Receiver found and responding
    Ready,
}

impl ReceiverState {
    fn can_transition_to(self, next: ReceiverState) -> bool {
        use ReceiverState::*;
        matches!(
            (self, next),
            (_, Closed)
                | (Closed, Open)
                | (Open, BaudProbing)
                | (Open, Ready)
                | (BaudProbing, Ready)
                | (Ready, BaudProbing)
        )
    }
}

impl fmt::Display for ReceiverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReceiverState::Closed => "closed",
            ReceiverState::Open => "open",
            ReceiverState::BaudProbing => "probing baud rates",
            ReceiverState::Ready => "ready",
        };
        write!(f, "{}", s)
    }
}

/// Cancels the current (or next) blocking wait of a [`Receiver`]
///
/// The flag is checked at every poll interval. The interrupted operation
/// returns [`RxError::Aborted`] and the flag is cleared.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    /// Request cancellation
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check for a pending cancellation request
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// A session with a u-blox receiver
///
/// Blocking and single-threaded. Messages that arrive while waiting for a
/// response to a poll or configuration command are kept and returned later by
/// [`Receiver::get_next_message`], in order.
pub struct Receiver {
    transport: Option<Box<dyn Transport>>,
    state: ReceiverState,
    options: ReceiverOptions,
    name: String,
    /// Baud rate to try first when autobauding
    preferred_baudrate: Option<u32>,
    parser: Parser,
    intake: VecDeque<ParserMsg>,
    abort: AbortHandle,
    ver_str: Option<String>,
}

impl Receiver {
    /// Open a session
    ///
    /// `target` is a serial port path, `ser://path[@baudrate]` or
    /// `tcp://host:port`. Depending on the options the baud rate is detected
    /// and the receiver version is queried.
    pub fn open(target: &str, options: ReceiverOptions) -> Result<Self, RxError> {
        let target = Target::parse(target)?;
        let transport = target.open()?;
        let preferred_baudrate = match &target {
            Target::Serial { baud_rate, .. } => *baud_rate,
            Target::Tcp { .. } => None,
        };
        Self::start(transport, options, target.short_name(), preferred_baudrate)
    }

    /// Open a session on an already open transport
    pub fn with_transport(
        transport: Box<dyn Transport>,
        options: ReceiverOptions,
    ) -> Result<Self, RxError> {
        Self::start(transport, options, "receiver".to_string(), None)
    }

    fn start(
        transport: Box<dyn Transport>,
        options: ReceiverOptions,
        base_name: String,
        preferred_baudrate: Option<u32>,
    ) -> Result<Self, RxError> {
        let name = options.name.clone().unwrap_or_else(|| base_name.clone());
        let mut rx = Self {
            transport: None,
            state: ReceiverState::Closed,
            options,
            name,
            preferred_baudrate,
            parser: Parser::new(),
            intake: VecDeque::new(),
            abort: AbortHandle::default(),
            ver_str: None,
        };
        rx.transport = Some(transport);
        rx.set_state(ReceiverState::Open)?;

        if rx.options.autobaud {
            rx.autobaud()?;
        } else {
            rx.set_state(ReceiverState::Ready)?;
        }

        if rx.options.detect {
            let ver = match rx.detect() {
                Ok(ver) => ver,
                Err(e) => {
                    warn!("{}: receiver detection failed: {}", rx.name, e);
                    rx.close();
                    return Err(e);
                }
            };
            if rx.options.name.is_none() {
                let module = ver.extension("MOD").unwrap_or(ver.hw_version.as_str());
                rx.name = format!("{} ({})", base_name, module);
            }
            rx.progress(format_args!("receiver version {}", ver.version_string()));
        }

        Ok(rx)
    }

    /// Close the session (no-op if already closed)
    pub fn close(&mut self) {
        if self.state == ReceiverState::Closed {
            return;
        }
        self.transport = None;
        self.parser.reset();
        self.intake.clear();
        self.state = ReceiverState::Closed;
        debug!("{}: closed", self.name);
    }

    /// Session name used in log messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Parser counters
    pub fn stats(&self) -> &ParserStats {
        self.parser.stats()
    }

    /// Handle to cancel blocking operations from another thread
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Send raw bytes
    pub fn send(&mut self, data: &[u8]) -> Result<(), RxError> {
        self.require(&[ReceiverState::Open, ReceiverState::Ready], "send")?;
        self.write_raw(data)
    }

    /// Get the next message if one is available, without waiting
    pub fn get_next_message(&mut self) -> Result<Option<ParserMsg>, RxError> {
        self.get_next_message_timeout(Duration::ZERO)
    }

    /// Get the next message, waiting at most `timeout` for one
    pub fn get_next_message_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<ParserMsg>, RxError> {
        self.require(&[ReceiverState::Open, ReceiverState::Ready], "read")?;
        if let Some(msg) = self.intake.pop_front() {
            return Ok(Some(msg));
        }
        self.next_from_stream(Instant::now() + timeout)
    }

    /// Poll a UBX message
    ///
    /// The request is sent up to `retries + 1` times. A UBX-ACK-NAK for the
    /// request fails the poll immediately.
    pub fn poll_ubx(&mut self, req: &PollRequest) -> Result<ParserMsg, RxError> {
        self.require(&[ReceiverState::Ready], "poll")?;
        self.poll(req)
    }

    /// Send a UBX-CFG message and wait for its acknowledgement
    pub fn send_ubx_cfg(&mut self, msg: &[u8], timeout_ms: u64) -> Result<(), RxError> {
        self.require(&[ReceiverState::Ready], "configure")?;
        let frame = UbxFrame::from_bytes(msg)?;
        let name = message_name(frame.cls, frame.id);

        self.write_raw(msg)?;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        while let Some(resp) = self.next_from_stream(deadline)? {
            if is_ack_for(&resp, UBX_ACK_ACK_MSGID, frame.cls, frame.id) {
                debug!("{}: {} acknowledged", self.name, name);
                return Ok(());
            }
            if is_ack_for(&resp, UBX_ACK_NAK_MSGID, frame.cls, frame.id) {
                return Err(RxError::NegativeAcknowledged { name });
            }
            self.keep(resp);
            if Instant::now() >= deadline {
                break;
            }
        }
        Err(RxError::Timeout { name, attempts: 1 })
    }

    /// Reset the receiver
    ///
    /// Does not wait for the receiver to come back.
    pub fn reset(&mut self, mode: ResetMode) -> Result<(), RxError> {
        self.require(&[ReceiverState::Ready], "reset")?;
        self.progress(format_args!("reset ({})", mode));

        if mode.reverts_config() {
            let msg = cfg_cfg(
                CFG_CFG_MASK_ALL,
                CFG_CFG_MASK_NONE,
                CFG_CFG_MASK_ALL,
                Some(CFG_CFG_DEVICE_BBR | CFG_CFG_DEVICE_FLASH),
            )?;
            self.send_ubx_cfg(&msg, DEFAULT_TIMEOUT_MS)?;
        }

        let (nav_bbr_mask, reset_mode) = mode.cfg_rst_params();
        let msg = cfg_rst(nav_bbr_mask, reset_mode)?;
        self.write_raw(&msg)
    }

    /// Current baud rate, `None` for transports without one
    pub fn baudrate(&self) -> Option<u32> {
        self.transport.as_ref().and_then(|t| t.baud_rate())
    }

    /// Change the baud rate of the transport (not of the receiver)
    pub fn set_baudrate(&mut self, baudrate: u32) -> Result<(), RxError> {
        self.require(
            &[ReceiverState::Open, ReceiverState::Ready],
            "change baud rate",
        )?;
        self.apply_baudrate(baudrate)
    }

    /// Find the baud rate at which the receiver responds
    ///
    /// Tries the rates in [`AUTOBAUD_RATES`] order (a rate given in the
    /// target first) and stops at the first rate with any valid response to a
    /// UBX-MON-VER poll. Closes the session if no rate works. Returns the
    /// rate found, `None` for transports without baud rate.
    pub fn autobaud(&mut self) -> Result<Option<u32>, RxError> {
        self.require(&[ReceiverState::Open, ReceiverState::Ready], "autobaud")?;
        self.set_state(ReceiverState::BaudProbing)?;

        let rates: Vec<Option<u32>> = if self.baudrate().is_some() {
            let preferred = self.preferred_baudrate;
            preferred
                .into_iter()
                .chain(AUTOBAUD_RATES.into_iter().filter(|&r| Some(r) != preferred))
                .map(Some)
                .collect()
        } else {
            vec![None]
        };

        for rate in rates {
            let result = match rate {
                Some(rate) => self.apply_baudrate(rate).and_then(|()| self.probe()),
                None => self.probe(),
            };
            match result {
                Ok(true) => {
                    self.set_state(ReceiverState::Ready)?;
                    match rate {
                        Some(rate) => self.progress(format_args!("receiver found at {} baud", rate)),
                        None => self.progress(format_args!("receiver found")),
                    }
                    return Ok(rate);
                }
                Ok(false) => {
                    if let Some(rate) = rate {
                        debug!("{}: no response at {} baud", self.name, rate);
                    }
                }
                Err(e) => {
                    self.close();
                    return Err(e);
                }
            }
        }

        warn!("{}: no receiver responding", self.name);
        self.close();
        Err(RxError::NoDeviceResponding)
    }

    /// Receiver version, e.g. "HPG 1.13 (ZED-F9P, PROTVER 27.12)"
    pub fn get_ver_str(&mut self) -> Result<String, RxError> {
        self.require(&[ReceiverState::Ready], "poll")?;
        match &self.ver_str {
            Some(ver_str) => Ok(ver_str.clone()),
            None => Ok(self.detect()?.version_string()),
        }
    }

    /// Read configuration items from a layer
    ///
    /// `keys` may contain wildcards. Large results are read in pages.
    pub fn get_config(
        &mut self,
        layer: Layers,
        keys: &[ConfigKey],
    ) -> Result<Vec<KeyValue>, RxError> {
        self.require(&[ReceiverState::Ready], "read configuration")?;
        let mut items = Vec::new();
        for keys in keys.chunks(VALGET_MAX_K) {
            let mut position: u16 = 0;
            loop {
                let req = PollRequest::from_frame(&build_valget_poll(keys, layer, position)?)?
                    .min_size(UBX_FRAME_SIZE + 4);
                let resp = match self.poll(&req) {
                    Ok(resp) => resp,
                    // No (more) items in this layer
                    Err(RxError::NegativeAcknowledged { .. }) => break,
                    Err(e) => return Err(e),
                };
                let page = parse_valget_response(resp.ubx_payload().unwrap_or_default())?;
                let count = page.items.len();
                trace!("{}: {} items at position {}", self.name, count, position);
                items.extend(page.items);
                if count < VALGET_MAX_K {
                    break;
                }
                position = position.saturating_add(count as u16);
            }
        }
        self.progress(format_args!("read {} items from {}", items.len(), layer));
        Ok(items)
    }

    /// Send configuration chunks, each acknowledged, stopping at the first failure
    pub fn apply_config<T>(
        &mut self,
        chunks: &[ConfigChunk<T>],
        timeout_ms: u64,
    ) -> Result<(), RxError> {
        self.require(&[ReceiverState::Ready], "configure")?;
        for chunk in chunks {
            self.progress(format_args!(
                "configuration {}/{}: {}",
                chunk.index + 1,
                chunks.len(),
                chunk.info()
            ));
            self.send_ubx_cfg(&chunk.msg, timeout_ms)?;
        }
        Ok(())
    }

    fn poll(&mut self, req: &PollRequest) -> Result<ParserMsg, RxError> {
        let msg = make_message(req.cls, req.id, &req.payload)?;
        let name = message_name(req.cls, req.id);
        let attempts = req.retries + 1;

        for attempt in 1..=attempts {
            debug!("{}: poll {} ({}/{})", self.name, name, attempt, attempts);
            self.write_raw(&msg)?;
            let deadline = Instant::now() + Duration::from_millis(req.timeout_ms);
            while let Some(resp) = self.next_from_stream(deadline)? {
                if resp.is_ubx(req.cls, req.id) && resp.size() >= req.min_size {
                    return Ok(resp);
                }
                if is_ack_for(&resp, UBX_ACK_NAK_MSGID, req.cls, req.id) {
                    return Err(RxError::NegativeAcknowledged { name });
                }
                self.keep(resp);
                if Instant::now() >= deadline {
                    break;
                }
            }
        }

        Err(RxError::Timeout { name, attempts })
    }

    fn detect(&mut self) -> Result<MonVer, RxError> {
        // sw and hw version at least
        let req = PollRequest::new(UBX_MON_CLSID, UBX_MON_VER_MSGID).min_size(UBX_FRAME_SIZE + 40);
        let resp = self.poll(&req)?;
        let ver = resp
            .ubx_payload()
            .and_then(MonVer::from_payload)
            .ok_or_else(|| RxError::InvalidResponse(format!("malformed {}", resp.name)))?;
        self.ver_str = Some(ver.version_string());
        Ok(ver)
    }

    /// Send a UBX-MON-VER poll and wait for any valid message
    fn probe(&mut self) -> Result<bool, RxError> {
        let cleared = match self.transport.as_mut() {
            Some(t) => t.clear_input_buffer(),
            None => return Err(self.invalid_state("probe")),
        };
        cleared.map_err(|e| self.fail(e))?;
        self.parser.reset();

        let msg = make_message(UBX_MON_CLSID, UBX_MON_VER_MSGID, &[])?;
        self.write_raw(&msg)?;
        let deadline = Instant::now() + Duration::from_millis(self.options.probe_timeout_ms);
        while let Some(resp) = self.next_from_stream(deadline)? {
            if !resp.is_garbage() {
                self.keep(resp);
                return Ok(true);
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        Ok(false)
    }

    fn apply_baudrate(&mut self, baudrate: u32) -> Result<(), RxError> {
        let result = match self.transport.as_mut() {
            Some(t) => t.set_baud_rate(baudrate),
            None => return Err(self.invalid_state("change baud rate")),
        };
        result.map_err(|e| self.fail(e))?;
        debug!("{}: baud rate {}", self.name, baudrate);
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), RxError> {
        let result = match self.transport.as_mut() {
            Some(t) => t.write_all(data).and_then(|()| t.flush()),
            None => return Err(self.invalid_state("send")),
        };
        result.map_err(|e| self.fail(e))?;
        trace!("{}: sent {} bytes", self.name, data.len());
        Ok(())
    }

    /// Next message from the parser, reading from the transport as needed
    ///
    /// Reads the transport at least once per call and not again once the
    /// deadline has passed. Callers that loop must check the deadline
    /// themselves, otherwise a busy link keeps them waiting.
    fn next_from_stream(&mut self, deadline: Instant) -> Result<Option<ParserMsg>, RxError> {
        let poll_interval = Duration::from_millis(self.options.poll_interval_ms);
        let mut buf = [0u8; 4096];
        let mut first = true;
        loop {
            if let Some(msg) = self.parser.process() {
                trace!("{}: received {}", self.name, msg);
                return Ok(Some(msg));
            }
            if self.abort.take() {
                debug!("{}: aborted", self.name);
                return Err(RxError::Aborted);
            }
            if !first && Instant::now() >= deadline {
                return Ok(None);
            }
            first = false;

            let result = match self.transport.as_mut() {
                Some(t) => read_available(&mut **t, &mut buf),
                None => return Err(self.invalid_state("read")),
            };
            let size = result.map_err(|e| self.fail(e))?;

            if size > 0 {
                self.parser.feed(&buf[..size]);
            } else if Instant::now() >= deadline {
                return Ok(None);
            } else {
                std::thread::sleep(poll_interval);
            }
        }
    }

    /// Queue an unrelated message for [`Receiver::get_next_message`]
    fn keep(&mut self, msg: ParserMsg) {
        if self.intake.len() >= MAX_INTAKE {
            if let Some(dropped) = self.intake.pop_front() {
                trace!("{}: intake full, dropping {}", self.name, dropped.name);
            }
        }
        self.intake.push_back(msg);
    }

    fn require(&self, allowed: &[ReceiverState], operation: &str) -> Result<(), RxError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn set_state(&mut self, next: ReceiverState) -> Result<(), RxError> {
        if !self.state.can_transition_to(next) {
            return Err(self.invalid_state(&format!("switch to {}", next)));
        }
        trace!("{}: {} -> {}", self.name, self.state, next);
        self.state = next;
        Ok(())
    }

    fn invalid_state(&self, operation: &str) -> RxError {
        RxError::InvalidState {
            state: self.state,
            operation: operation.to_string(),
        }
    }

    /// Close the session after a transport error
    fn fail(&mut self, e: io::Error) -> RxError {
        warn!("{}: transport failure: {}", self.name, e);
        self.close();
        RxError::TransportFailure(e.to_string())
    }

    fn progress(&self, args: fmt::Arguments<'_>) {
        if self.options.verbose {
            info!("{}: {}", self.name, args);
        } else {
            debug!("{}: {}", self.name, args);
        }
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("baudrate", &self.baudrate())
            .field("intake", &self.intake.len())
            .finish()
    }
}

fn is_ack_for(msg: &ParserMsg, ack_id: u8, cls: u8, id: u8) -> bool {
    msg.is_ubx(UBX_ACK_CLSID, ack_id) && msg.ubx_payload() == Some(&[cls, id][..])
}

/// Read what is available without blocking
fn read_available(transport: &mut dyn Transport, buf: &mut [u8]) -> io::Result<usize> {
    let available = transport.bytes_to_read()? as usize;
    if available == 0 {
        return Ok(0);
    }
    let size = available.min(buf.len());
    match transport.read(&mut buf[..size]) {
        Ok(0) => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed",
        )),
        Ok(n) => Ok(n),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ) =>
        {
            Ok(0)
        }
        Err(e) => Err(e),
    }
}
