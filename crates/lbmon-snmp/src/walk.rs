//! GetNext walk engine
//!
//! Drives repeated GetNext requests over a lossy datagram transport to read
//! every counter under a root oid, in ascending order. The retry loop is the
//! only reliability mechanism: a request that goes unanswered is resent
//! unchanged after an exponentially growing delay until the retry budget runs
//! out.

use crate::pdu::{Message, Pdu, PduKind, VarBind};
use crate::sequence::RequestSequence;
use crate::transport::{Connector, Transport, UdpConnector};
use async_trait::async_trait;
use lbmon_common::{
    CounterBinding, Oid, Result, SnmpError, DEFAULT_COMMUNITY, DEFAULT_INITIAL_BACKOFF_MS,
    DEFAULT_MAX_RETRIES, DEFAULT_REPORT_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Largest datagram a UDP socket can hand back
const MAX_DATAGRAM_SIZE: usize = 65_535;

/// Walk tuning
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Community string sent with every request
    pub community: String,
    /// Resends allowed for one unanswered request
    pub max_retries: u32,
    /// Delay before the first resend; doubles on every further resend
    pub initial_backoff: Duration,
    /// How long to wait for each response
    pub timeout: Duration,
    /// How often a long walk logs its datagram count
    pub report_interval: Duration,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            community: DEFAULT_COMMUNITY.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            report_interval: Duration::from_millis(DEFAULT_REPORT_INTERVAL_MS),
        }
    }
}

/// Reads every counter under a root oid
#[async_trait]
pub trait Walker: Send + Sync {
    /// Bindings strictly inside the subtree at `root`, in ascending oid order
    async fn walk(&self, root: &Oid) -> Result<Vec<CounterBinding>>;

    /// Agent endpoint being walked, for logs and snapshots
    fn endpoint(&self) -> String;
}

/// Why a walk stopped. Checked in declaration order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The agent reported a non-zero error-status
    ErrorStatus,
    /// The response carried no binding
    MissingOid,
    /// noSuchObject, noSuchInstance or endOfMibView
    ExceptionValue,
    /// The returned oid is shorter than the root
    ShorterThanRoot,
    /// The returned oid left the root's subtree
    OutsideSubtree,
    /// The returned oid did not advance past the one requested
    NotIncreasing,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Termination::ErrorStatus => "agent error status",
            Termination::MissingOid => "no oid in response",
            Termination::ExceptionValue => "exception value",
            Termination::ShorterThanRoot => "oid shorter than root",
            Termination::OutsideSubtree => "left subtree",
            Termination::NotIncreasing => "oid did not increase",
        };
        f.write_str(reason)
    }
}

/// Decide whether a response ends the walk or yields the next binding
pub fn evaluate<'a>(
    root: &Oid,
    requested: &Oid,
    response: &'a Pdu,
) -> std::result::Result<&'a VarBind, Termination> {
    if response.error_status != 0 {
        return Err(Termination::ErrorStatus);
    }
    let vb = match response.varbinds.first() {
        Some(vb) if !vb.oid.is_empty() => vb,
        _ => return Err(Termination::MissingOid),
    };
    if vb.value.is_exception() {
        return Err(Termination::ExceptionValue);
    }
    if vb.oid.len() < root.len() {
        return Err(Termination::ShorterThanRoot);
    }
    if !vb.oid.starts_with(root) {
        return Err(Termination::OutsideSubtree);
    }
    if vb.oid <= *requested {
        return Err(Termination::NotIncreasing);
    }
    Ok(vb)
}

/// Per-walk state. Lives for one `walk` call only.
struct WalkState {
    root: Oid,
    /// Last accepted oid; the next request asks for its successor
    cursor: Oid,
    retries_left: u32,
    delay: Duration,
    packets_sent: u32,
    bindings: Vec<CounterBinding>,
}

impl WalkState {
    fn new(root: &Oid, config: &WalkConfig) -> Self {
        Self {
            root: root.clone(),
            cursor: root.clone(),
            retries_left: config.max_retries,
            delay: config.initial_backoff,
            packets_sent: 0,
            bindings: Vec::new(),
        }
    }

    /// Spend one retry and wait out the backoff, or fail if none are left
    async fn back_off(&mut self, max_retries: u32) -> Result<()> {
        if self.retries_left == 0 {
            return Err(SnmpError::RetryExceeded {
                packets_sent: self.packets_sent,
                retries: max_retries,
            });
        }
        self.retries_left -= 1;
        debug!(
            delay_ms = self.delay.as_millis() as u64,
            retries_left = self.retries_left,
            packets_sent = self.packets_sent,
            "Timeout waiting for agent response, backing off"
        );
        tokio::time::sleep(self.delay).await;
        self.delay = self.delay.saturating_mul(2);
        Ok(())
    }
}

/// SNMPv1 walker over any [`Connector`]
pub struct SnmpWalker<C> {
    connector: C,
    sequence: Arc<RequestSequence>,
    config: WalkConfig,
}

impl SnmpWalker<UdpConnector> {
    /// Walker for a UDP agent at `host:port`
    pub fn udp(
        host: impl Into<String>,
        port: u16,
        sequence: Arc<RequestSequence>,
        config: WalkConfig,
    ) -> Self {
        Self::new(UdpConnector::new(host, port), sequence, config)
    }
}

impl<C: Connector> SnmpWalker<C> {
    pub fn new(connector: C, sequence: Arc<RequestSequence>, config: WalkConfig) -> Self {
        Self {
            connector,
            sequence,
            config,
        }
    }

    fn request_for(&self, oid: &Oid) -> Message {
        Message::new(
            self.config.community.as_bytes(),
            Pdu::get_next(self.sequence.next_id(), oid.clone()),
        )
    }

    async fn drive(&self, transport: &mut dyn Transport, root: &Oid) -> Result<Vec<CounterBinding>> {
        let mut state = WalkState::new(root, &self.config);
        let mut request = self.request_for(&state.cursor);
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut last_report = Instant::now();

        loop {
            if last_report.elapsed() >= self.config.report_interval {
                debug!(packets_sent = state.packets_sent, "Walk in progress");
                last_report = Instant::now();
            }

            transport
                .send(&request.encode())
                .await
                .map_err(|e| SnmpError::general("error sending request to agent", e))?;
            state.packets_sent += 1;

            let response = match self
                .await_response(transport, request.pdu.request_id, &mut buf)
                .await?
            {
                Some(pdu) => pdu,
                None => {
                    // Resend the same request: same oid, same request id
                    state.back_off(self.config.max_retries).await?;
                    continue;
                }
            };

            let vb = match evaluate(&state.root, &state.cursor, &response) {
                Ok(vb) => vb,
                Err(reason) => {
                    debug!(
                        %reason,
                        bindings = state.bindings.len(),
                        packets_sent = state.packets_sent,
                        "Walk finished"
                    );
                    return Ok(state.bindings);
                }
            };

            let value = vb.value.as_u64().ok_or_else(|| {
                SnmpError::general_msg(format!("non-counter value {} at {}", vb.value, vb.oid))
            })?;
            state.bindings.push(CounterBinding::new(vb.oid.clone(), value));
            state.cursor = vb.oid.clone();
            request = self.request_for(&state.cursor);
        }
    }

    /// Wait for the response to `request_id`, or `None` once the attempt times out.
    /// Undecodable, unexpected and stale datagrams are skipped, as are
    /// responses carrying another community.
    async fn await_response(
        &self,
        transport: &mut dyn Transport,
        request_id: i32,
        buf: &mut [u8],
    ) -> Result<Option<Pdu>> {
        let deadline = Instant::now() + self.config.timeout;
        loop {
            let len = match tokio::time::timeout_at(deadline, transport.recv(buf)).await {
                Err(_elapsed) => return Ok(None),
                Ok(Err(e)) => return Err(SnmpError::general("error receiving from agent", e)),
                Ok(Ok(len)) => len,
            };

            match Message::decode(&buf[..len]) {
                Ok(msg)
                    if msg.pdu.kind == PduKind::GetResponse
                        && msg.pdu.request_id == request_id
                        && msg.community == self.config.community.as_bytes() =>
                {
                    return Ok(Some(msg.pdu));
                }
                Ok(msg) => {
                    debug!(
                        expected = request_id,
                        got = msg.pdu.request_id,
                        kind = ?msg.pdu.kind,
                        "Discarding unexpected datagram"
                    );
                }
                Err(e) => warn!(error = %e, len, "Discarding malformed datagram"),
            }
        }
    }
}

#[async_trait]
impl<C: Connector> Walker for SnmpWalker<C> {
    #[instrument(skip(self, root), fields(agent = %self.connector.endpoint(), root = %root))]
    async fn walk(&self, root: &Oid) -> Result<Vec<CounterBinding>> {
        let mut transport = self.connector.open().await?;
        let outcome = self.drive(transport.as_mut(), root).await;
        let closed = transport.close().await;

        match (outcome, closed) {
            (Ok(bindings), Ok(())) => Ok(bindings),
            (Ok(_), Err(e)) => Err(SnmpError::general("could not close transport", e)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!(error = %close_err, "Could not close transport after failed walk");
                Err(err)
            }
        }
    }

    fn endpoint(&self) -> String {
        self.connector.endpoint()
    }
}

impl<C: Connector> fmt::Display for SnmpWalker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SnmpWalker{{agent={}, maxRetries={}, curRequestId={}}}",
            self.connector.endpoint(),
            self.config.max_retries,
            self.sequence.current()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::Value;
    use std::collections::{BTreeMap, VecDeque};
    use std::io;
    use std::sync::Mutex;

    type Responder = Box<dyn FnMut(&Message) -> Vec<Vec<u8>> + Send>;

    struct ScriptState {
        responder: Responder,
        sends: Vec<(Instant, Message)>,
        opened: usize,
        closed: usize,
        fail_open: bool,
        fail_close: bool,
    }

    /// Scripted agent shared between a connector and the transports it opens
    #[derive(Clone)]
    struct Script(Arc<Mutex<ScriptState>>);

    impl Script {
        fn new(responder: Responder) -> Self {
            Self(Arc::new(Mutex::new(ScriptState {
                responder,
                sends: Vec::new(),
                opened: 0,
                closed: 0,
                fail_open: false,
                fail_close: false,
            })))
        }

        fn sends(&self) -> Vec<(Instant, Message)> {
            self.0.lock().unwrap().sends.clone()
        }

        fn opened_closed(&self) -> (usize, usize) {
            let st = self.0.lock().unwrap();
            (st.opened, st.closed)
        }
    }

    #[async_trait]
    impl Connector for Script {
        async fn open(&self) -> Result<Box<dyn Transport>> {
            let mut st = self.0.lock().unwrap();
            if st.fail_open {
                return Err(SnmpError::setup(
                    "unable to listen",
                    io::Error::new(io::ErrorKind::AddrInUse, "in use"),
                ));
            }
            st.opened += 1;
            Ok(Box::new(ScriptedTransport {
                script: self.clone(),
                inbox: VecDeque::new(),
            }))
        }

        fn endpoint(&self) -> String {
            "mock:161".to_string()
        }
    }

    struct ScriptedTransport {
        script: Script,
        inbox: VecDeque<Vec<u8>>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
            let msg = Message::decode(datagram).expect("walker sent a malformed request");
            let mut st = self.script.0.lock().unwrap();
            st.sends.push((Instant::now(), msg.clone()));
            let replies = (st.responder)(&msg);
            self.inbox.extend(replies);
            Ok(())
        }

        async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.inbox.pop_front() {
                Some(datagram) => {
                    buf[..datagram.len()].copy_from_slice(&datagram);
                    Ok(datagram.len())
                }
                // Nothing queued: behave like a lost packet
                None => std::future::pending().await,
            }
        }

        async fn close(self: Box<Self>) -> io::Result<()> {
            let mut st = self.script.0.lock().unwrap();
            st.closed += 1;
            if st.fail_close {
                return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
            }
            Ok(())
        }
    }

    fn oid(text: &str) -> Oid {
        text.parse().unwrap()
    }

    fn reply(request: &Message, varbinds: Vec<VarBind>) -> Vec<u8> {
        Message::new("public", Pdu::response(request.pdu.request_id, varbinds))
            .encode()
            .to_vec()
    }

    /// Answers GetNext from an ordered table, endOfMibView past the last row
    fn mib_agent(mib: BTreeMap<Oid, Value>) -> Responder {
        Box::new(move |request| {
            let asked = &request.pdu.varbinds[0].oid;
            let next = mib
                .range((std::ops::Bound::Excluded(asked.clone()), std::ops::Bound::Unbounded))
                .next();
            let vb = match next {
                Some((oid, value)) => VarBind::new(oid.clone(), value.clone()),
                None => VarBind::new(asked.clone(), Value::EndOfMibView),
            };
            vec![reply(request, vec![vb])]
        })
    }

    fn walker(script: &Script, config: WalkConfig) -> SnmpWalker<Script> {
        SnmpWalker::new(script.clone(), Arc::new(RequestSequence::new()), config)
    }

    #[tokio::test]
    async fn test_walk_returns_subtree_in_order() {
        let root = oid("1.3.6.1.4.1.7146.1.2.2.2.1.9");
        let mut mib = BTreeMap::new();
        mib.insert(oid("1.3.6.1.4.1.7146.1.2.2.2.1.8.1.65"), Value::Counter32(1));
        mib.insert(root.child(&[3, 86, 83, 50]), Value::Gauge32(10));
        mib.insert(root.child(&[3, 86, 83, 49]), Value::Gauge32(5));
        mib.insert(root.child(&[2, 86, 49]), Value::Counter64(7));
        let script = Script::new(mib_agent(mib));

        let bindings = walker(&script, WalkConfig::default()).walk(&root).await.unwrap();

        let oids: Vec<Oid> = bindings.iter().map(|b| b.oid.clone()).collect();
        assert_eq!(
            oids,
            vec![
                root.child(&[2, 86, 49]),
                root.child(&[3, 86, 83, 49]),
                root.child(&[3, 86, 83, 50]),
            ]
        );
        let values: Vec<u64> = bindings.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![7, 5, 10]);
        // three bindings plus the request answered with endOfMibView
        assert_eq!(script.sends().len(), 4);
        assert_eq!(script.opened_closed(), (1, 1));
    }

    #[tokio::test]
    async fn test_walk_stops_when_leaving_subtree() {
        let root = oid("1.3.6.1.4.1.7146.1.2.2.2.1.9");
        let mut mib = BTreeMap::new();
        mib.insert(root.child(&[1, 65]), Value::Counter32(3));
        mib.insert(oid("1.3.6.1.4.1.7146.1.2.2.2.1.10.1.65"), Value::Counter32(99));
        let script = Script::new(mib_agent(mib));

        let bindings = walker(&script, WalkConfig::default()).walk(&root).await.unwrap();

        assert_eq!(bindings, vec![CounterBinding::new(root.child(&[1, 65]), 3)]);
    }

    #[tokio::test]
    async fn test_empty_subtree() {
        let root = oid("1.3.6.1.4.1.7146.1.2.2.2.1.11");
        let script = Script::new(mib_agent(BTreeMap::new()));

        let bindings = walker(&script, WalkConfig::default()).walk(&root).await.unwrap();

        assert!(bindings.is_empty());
        assert_eq!(script.sends().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exceeded_after_budget_with_doubling_backoff() {
        let script = Script::new(Box::new(|_| Vec::new()));
        let config = WalkConfig::default();
        let timeout = config.timeout;
        let root = oid("1.3.6.1.4.1.7146.1.2.2.2.1.9");

        let err = walker(&script, config).walk(&root).await.unwrap_err();

        assert!(matches!(
            err,
            SnmpError::RetryExceeded {
                packets_sent: 14,
                retries: 13
            }
        ));

        let sends = script.sends();
        assert_eq!(sends.len(), DEFAULT_MAX_RETRIES as usize + 1);
        for (i, pair) in sends.windows(2).enumerate() {
            let gap = pair[1].0 - pair[0].0;
            let expected = timeout + Duration::from_millis(1 << i);
            assert!(
                gap >= expected && gap <= expected + Duration::from_millis(1),
                "retry {} waited {:?}, expected {:?}",
                i,
                gap,
                expected
            );
            // identical resend
            assert_eq!(pair[1].1, pair[0].1);
        }
        assert_eq!(script.opened_closed(), (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_lost_packets() {
        let root = oid("1.3.6.1.2.1.2");
        let mut mib = BTreeMap::new();
        mib.insert(root.child(&[1, 0]), Value::Integer(4));
        let mut inner = mib_agent(mib);
        let mut seen = 0;
        let script = Script::new(Box::new(move |request| {
            seen += 1;
            if seen <= 2 {
                Vec::new()
            } else {
                inner(request)
            }
        }));
        let sequence = Arc::new(RequestSequence::new());
        let walker = SnmpWalker::new(script.clone(), sequence.clone(), WalkConfig::default());

        let bindings = walker.walk(&root).await.unwrap();

        assert_eq!(bindings, vec![CounterBinding::new(root.child(&[1, 0]), 4)]);
        let sends = script.sends();
        assert_eq!(sends.len(), 4);
        let ids: Vec<i32> = sends.iter().map(|(_, m)| m.pdu.request_id).collect();
        // first request retried twice unchanged, then a fresh id for the next step
        assert_eq!(ids, vec![1, 1, 1, 2]);
        assert_eq!(sends[3].1.pdu.varbinds[0].oid, root.child(&[1, 0]));
        assert_eq!(sequence.current(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_retry_budget() {
        let script = Script::new(Box::new(|_| Vec::new()));
        let config = WalkConfig {
            max_retries: 1,
            ..WalkConfig::default()
        };

        let err = walker(&script, config).walk(&oid("1.3.6")).await.unwrap_err();

        assert!(matches!(
            err,
            SnmpError::RetryExceeded {
                packets_sent: 2,
                retries: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_error_status_stops_walk() {
        let root = oid("1.3.6.1.4.1");
        let mut calls = 0;
        let script = Script::new(Box::new(move |request| {
            calls += 1;
            let pdu = if calls == 1 {
                Pdu::response(
                    request.pdu.request_id,
                    vec![VarBind::new(oid("1.3.6.1.4.1.5"), Value::Counter32(1))],
                )
            } else {
                // noSuchName
                Pdu::response(request.pdu.request_id, request.pdu.varbinds.clone()).with_error(2, 1)
            };
            vec![Message::new("public", pdu).encode().to_vec()]
        }));

        let bindings = walker(&script, WalkConfig::default()).walk(&root).await.unwrap();

        assert_eq!(bindings.len(), 1);
        assert_eq!(script.sends().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_oid_stops_walk() {
        let script = Script::new(Box::new(|request| vec![reply(request, Vec::new())]));

        let bindings = walker(&script, WalkConfig::default())
            .walk(&oid("1.3.6.1"))
            .await
            .unwrap();

        assert!(bindings.is_empty());
    }

    #[tokio::test]
    async fn test_non_increasing_oid_stops_walk() {
        let root = oid("1.3.6.1.4.1");
        let looping = root.child(&[1]);
        let script = Script::new(Box::new(move |request| {
            vec![reply(request, vec![VarBind::new(looping.clone(), Value::Counter32(8))])]
        }));

        let bindings = walker(&script, WalkConfig::default()).walk(&root).await.unwrap();

        assert_eq!(bindings, vec![CounterBinding::new(root.child(&[1]), 8)]);
        assert_eq!(script.sends().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_and_malformed_datagrams_are_skipped() {
        let root = oid("1.3.6.1.4.1");
        let mut mib = BTreeMap::new();
        mib.insert(root.child(&[2]), Value::Counter32(12));
        let mut inner = mib_agent(mib);
        let script = Script::new(Box::new(move |request| {
            let stale = Message::new(
                "public",
                Pdu::response(
                    request.pdu.request_id.wrapping_add(1000),
                    vec![VarBind::new(root_sibling(), Value::Counter32(666))],
                ),
            );
            let mut out = vec![vec![0xde, 0xad, 0xbe, 0xef], stale.encode().to_vec()];
            out.extend(inner(request));
            out
        }));

        let bindings = walker(&script, WalkConfig::default()).walk(&root).await.unwrap();

        assert_eq!(bindings, vec![CounterBinding::new(root.child(&[2]), 12)]);
    }

    #[tokio::test]
    async fn test_response_with_other_community_is_skipped() {
        let root = oid("1.3.6.1.4.1");
        let mut mib = BTreeMap::new();
        mib.insert(root.child(&[2]), Value::Counter32(12));
        let mut inner = mib_agent(mib);
        let forged_row = root.child(&[1]);
        let script = Script::new(Box::new(move |request| {
            let forged = Message::new(
                "intruder",
                Pdu::response(
                    request.pdu.request_id,
                    vec![VarBind::new(forged_row.clone(), Value::Counter32(999_999))],
                ),
            );
            let mut out = vec![forged.encode().to_vec()];
            out.extend(inner(request));
            out
        }));

        let bindings = walker(&script, WalkConfig::default()).walk(&root).await.unwrap();

        assert_eq!(bindings, vec![CounterBinding::new(root.child(&[2]), 12)]);
    }

    fn root_sibling() -> Oid {
        oid("1.3.6.1.4.1.2")
    }

    #[tokio::test]
    async fn test_non_numeric_value_is_general_failure() {
        let root = oid("1.3.6.1.4.1");
        let mut mib = BTreeMap::new();
        mib.insert(root.child(&[1]), Value::OctetString(b"vs1".to_vec()));
        let script = Script::new(mib_agent(mib));

        let err = walker(&script, WalkConfig::default()).walk(&root).await.unwrap_err();

        assert!(matches!(err, SnmpError::General { .. }));
        assert_eq!(script.opened_closed(), (1, 1));
    }

    #[tokio::test]
    async fn test_setup_failure_sends_nothing() {
        let script = Script::new(Box::new(|_| Vec::new()));
        script.0.lock().unwrap().fail_open = true;

        let err = walker(&script, WalkConfig::default())
            .walk(&oid("1.3.6.1"))
            .await
            .unwrap_err();

        assert!(matches!(err, SnmpError::Setup { .. }));
        assert!(script.sends().is_empty());
    }

    #[tokio::test]
    async fn test_close_failure_is_general_failure() {
        let script = Script::new(mib_agent(BTreeMap::new()));
        script.0.lock().unwrap().fail_close = true;

        let err = walker(&script, WalkConfig::default())
            .walk(&oid("1.3.6.1"))
            .await
            .unwrap_err();

        assert!(matches!(err, SnmpError::General { .. }));
        assert!(err.to_string().contains("close"));
    }

    #[tokio::test]
    async fn test_requests_carry_community() {
        let script = Script::new(mib_agent(BTreeMap::new()));
        let config = WalkConfig {
            community: "s3cret".to_string(),
            ..WalkConfig::default()
        };

        walker(&script, config).walk(&oid("1.3.6.1")).await.unwrap();

        let sends = script.sends();
        assert_eq!(sends[0].1.community, b"s3cret");
        assert_eq!(sends[0].1.pdu.kind, PduKind::GetNextRequest);
    }

    #[test]
    fn test_termination_priority() {
        let root = oid("1.3.6.1.4.1");
        // exception value on a shorter oid: the exception wins
        let pdu = Pdu::response(1, vec![VarBind::new(oid("1.3"), Value::NoSuchObject)]);
        assert_eq!(evaluate(&root, &root, &pdu), Err(Termination::ExceptionValue));

        // error status beats everything
        let pdu = pdu.with_error(5, 1);
        assert_eq!(evaluate(&root, &root, &pdu), Err(Termination::ErrorStatus));

        let short = Pdu::response(1, vec![VarBind::new(oid("1.3"), Value::Counter32(1))]);
        assert_eq!(evaluate(&root, &root, &short), Err(Termination::ShorterThanRoot));

        let outside = Pdu::response(1, vec![VarBind::new(oid("1.3.6.1.4.2.1"), Value::Counter32(1))]);
        assert_eq!(evaluate(&root, &root, &outside), Err(Termination::OutsideSubtree));

        let requested = root.child(&[5]);
        let behind = Pdu::response(1, vec![VarBind::new(root.child(&[4]), Value::Counter32(1))]);
        assert_eq!(evaluate(&root, &requested, &behind), Err(Termination::NotIncreasing));

        let ahead = Pdu::response(1, vec![VarBind::new(root.child(&[6]), Value::Counter32(1))]);
        assert!(evaluate(&root, &requested, &ahead).is_ok());
    }

    #[test]
    fn test_display() {
        let script = Script::new(Box::new(|_| Vec::new()));
        let text = walker(&script, WalkConfig::default()).to_string();
        assert!(text.contains("agent=mock:161"));
        assert!(text.contains("maxRetries=13"));
    }
}
