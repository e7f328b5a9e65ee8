use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ExamplePayload {
    pub label: &'static str,
    pub hex_string: &'static str,
}

/// Captured sensor advertisements to try the decoder with.
pub const EXAMPLE_PAYLOADS: [ExamplePayload; 4] = [
    ExamplePayload {
        label: "gen2, 11 peaks",
        hex_string: "1AFF0D000002B765924F310302157CA080030D74E08107EA287B270302A0AD",
    },
    ExamplePayload {
        label: "gen2, 5 peaks",
        hex_string: "1AFF0D000002B867F34E3183051C04B08001000080810275287B270302A0AD",
    },
    ExamplePayload {
        label: "gen2, silent peak",
        hex_string: "1AFF0D000002B567D3CE3147041C088041041C28E041007E287B270302A0AD",
    },
    ExamplePayload {
        label: "gen2, 2 peaks",
        hex_string: "1AFF0D000002AC67153CE04100000C30C000036C9080074D287B270302A0AD",
    },
];
