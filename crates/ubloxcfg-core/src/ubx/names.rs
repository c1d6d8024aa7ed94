//! UBX message catalogue
//!
//! Maps class/ID pairs to canonical names. Class-only entries cover IDs that
//! are not listed individually.

/// A catalogue entry: a class (`id == None`) or a specific message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UbxMsgDef {
    /// Message class
    pub cls: u8,
    /// Message ID, `None` for class entries
    pub id: Option<u8>,
    /// Canonical name
    pub name: &'static str,
}

const fn class(cls: u8, name: &'static str) -> UbxMsgDef {
    UbxMsgDef { cls, id: None, name }
}

const fn msg(cls: u8, id: u8, name: &'static str) -> UbxMsgDef {
    UbxMsgDef { cls, id: Some(id), name }
}

/// All known classes and messages, sorted by (class, ID) with the class entry first
pub static UBX_MESSAGES: &[UbxMsgDef] = &[
    class(0x01, "UBX-NAV"),
    msg(0x01, 0x01, "UBX-NAV-POSECEF"),
    msg(0x01, 0x02, "UBX-NAV-POSLLH"),
    msg(0x01, 0x03, "UBX-NAV-STATUS"),
    msg(0x01, 0x04, "UBX-NAV-DOP"),
    msg(0x01, 0x07, "UBX-NAV-PVT"),
    msg(0x01, 0x09, "UBX-NAV-ODO"),
    msg(0x01, 0x10, "UBX-NAV-RESETODO"),
    msg(0x01, 0x11, "UBX-NAV-VELECEF"),
    msg(0x01, 0x12, "UBX-NAV-VELNED"),
    msg(0x01, 0x13, "UBX-NAV-HPPOSECEF"),
    msg(0x01, 0x14, "UBX-NAV-HPPOSLLH"),
    msg(0x01, 0x20, "UBX-NAV-TIMEGPS"),
    msg(0x01, 0x21, "UBX-NAV-TIMEUTC"),
    msg(0x01, 0x22, "UBX-NAV-CLOCK"),
    msg(0x01, 0x23, "UBX-NAV-TIMEGLO"),
    msg(0x01, 0x24, "UBX-NAV-TIMEBDS"),
    msg(0x01, 0x25, "UBX-NAV-TIMEGAL"),
    msg(0x01, 0x26, "UBX-NAV-TIMELS"),
    msg(0x01, 0x27, "UBX-NAV-TIMEQZSS"),
    msg(0x01, 0x34, "UBX-NAV-ORB"),
    msg(0x01, 0x35, "UBX-NAV-SAT"),
    msg(0x01, 0x36, "UBX-NAV-COV"),
    msg(0x01, 0x39, "UBX-NAV-GEOFENCE"),
    msg(0x01, 0x3b, "UBX-NAV-SVIN"),
    msg(0x01, 0x3c, "UBX-NAV-RELPOSNED"),
    msg(0x01, 0x43, "UBX-NAV-SIG"),
    msg(0x01, 0x61, "UBX-NAV-EOE"),
    class(0x02, "UBX-RXM"),
    msg(0x02, 0x13, "UBX-RXM-SFRBX"),
    msg(0x02, 0x14, "UBX-RXM-MEASX"),
    msg(0x02, 0x15, "UBX-RXM-RAWX"),
    msg(0x02, 0x32, "UBX-RXM-RTCM"),
    msg(0x02, 0x41, "UBX-RXM-PMREQ"),
    msg(0x02, 0x59, "UBX-RXM-RLM"),
    class(0x04, "UBX-INF"),
    msg(0x04, 0x00, "UBX-INF-ERROR"),
    msg(0x04, 0x01, "UBX-INF-WARNING"),
    msg(0x04, 0x02, "UBX-INF-NOTICE"),
    msg(0x04, 0x03, "UBX-INF-TEST"),
    msg(0x04, 0x04, "UBX-INF-DEBUG"),
    class(0x05, "UBX-ACK"),
    msg(0x05, 0x00, "UBX-ACK-NAK"),
    msg(0x05, 0x01, "UBX-ACK-ACK"),
    class(0x06, "UBX-CFG"),
    msg(0x06, 0x00, "UBX-CFG-PRT"),
    msg(0x06, 0x01, "UBX-CFG-MSG"),
    msg(0x06, 0x04, "UBX-CFG-RST"),
    msg(0x06, 0x08, "UBX-CFG-RATE"),
    msg(0x06, 0x09, "UBX-CFG-CFG"),
    msg(0x06, 0x57, "UBX-CFG-PWR"),
    msg(0x06, 0x8a, "UBX-CFG-VALSET"),
    msg(0x06, 0x8b, "UBX-CFG-VALGET"),
    msg(0x06, 0x8c, "UBX-CFG-VALDEL"),
    class(0x09, "UBX-UPD"),
    msg(0x09, 0x14, "UBX-UPD-SOS"),
    class(0x0a, "UBX-MON"),
    msg(0x0a, 0x02, "UBX-MON-IO"),
    msg(0x0a, 0x04, "UBX-MON-VER"),
    msg(0x0a, 0x06, "UBX-MON-MSGPP"),
    msg(0x0a, 0x07, "UBX-MON-RXBUF"),
    msg(0x0a, 0x08, "UBX-MON-TXBUF"),
    msg(0x0a, 0x09, "UBX-MON-HW"),
    msg(0x0a, 0x0b, "UBX-MON-HW2"),
    msg(0x0a, 0x21, "UBX-MON-RXR"),
    msg(0x0a, 0x27, "UBX-MON-PATCH"),
    msg(0x0a, 0x28, "UBX-MON-GNSS"),
    msg(0x0a, 0x31, "UBX-MON-SPAN"),
    msg(0x0a, 0x36, "UBX-MON-COMMS"),
    msg(0x0a, 0x37, "UBX-MON-HW3"),
    msg(0x0a, 0x38, "UBX-MON-RF"),
    msg(0x0a, 0x39, "UBX-MON-SYS"),
    class(0x0d, "UBX-TIM"),
    msg(0x0d, 0x01, "UBX-TIM-TP"),
    msg(0x0d, 0x03, "UBX-TIM-TM2"),
    msg(0x0d, 0x06, "UBX-TIM-VRFY"),
    class(0x10, "UBX-ESF"),
    msg(0x10, 0x02, "UBX-ESF-MEAS"),
    msg(0x10, 0x03, "UBX-ESF-RAW"),
    msg(0x10, 0x10, "UBX-ESF-STATUS"),
    msg(0x10, 0x15, "UBX-ESF-INS"),
    class(0x13, "UBX-MGA"),
    msg(0x13, 0x00, "UBX-MGA-GPS"),
    msg(0x13, 0x02, "UBX-MGA-GAL"),
    msg(0x13, 0x03, "UBX-MGA-BDS"),
    msg(0x13, 0x05, "UBX-MGA-QZSS"),
    msg(0x13, 0x06, "UBX-MGA-GLO"),
    msg(0x13, 0x40, "UBX-MGA-INI"),
    msg(0x13, 0x60, "UBX-MGA-ACK"),
    msg(0x13, 0x80, "UBX-MGA-DBD"),
    class(0x21, "UBX-LOG"),
    msg(0x21, 0x03, "UBX-LOG-ERASE"),
    msg(0x21, 0x04, "UBX-LOG-STR"),
    msg(0x21, 0x07, "UBX-LOG-CREATE"),
    msg(0x21, 0x08, "UBX-LOG-INFO"),
    msg(0x21, 0x09, "UBX-LOG-RETR"),
    msg(0x21, 0x0b, "UBX-LOG-RETRPOS"),
    msg(0x21, 0x0d, "UBX-LOG-RETRSTR"),
    msg(0x21, 0x0e, "UBX-LOG-FINDTIME"),
    msg(0x21, 0x0f, "UBX-LOG-RETRPOSX"),
    class(0x27, "UBX-SEC"),
    msg(0x27, 0x03, "UBX-SEC-UNIQUEID"),
    class(0x28, "UBX-HNR"),
];

fn lookup(cls: u8, id: Option<u8>) -> Option<&'static UbxMsgDef> {
    UBX_MESSAGES
        .binary_search_by_key(&(cls, id), |def| (def.cls, def.id))
        .ok()
        .map(|ix| &UBX_MESSAGES[ix])
}

/// Get the name of a message class, if known
pub fn class_name(cls: u8) -> Option<&'static str> {
    lookup(cls, None).map(|def| def.name)
}

/// Get the canonical name of a message
///
/// Unknown messages of a known class are named after the class
/// (e.g. "UBX-NAV-7F"), entirely unknown ones numerically ("UBX-A0-01").
pub fn message_name(cls: u8, id: u8) -> String {
    if let Some(def) = lookup(cls, Some(id)) {
        return def.name.to_string();
    }
    match class_name(cls) {
        Some(name) => format!("{}-{:02X}", name, id),
        None => format!("UBX-{:02X}-{:02X}", cls, id),
    }
}
