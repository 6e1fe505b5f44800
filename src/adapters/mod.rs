//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements              | Connects to               |
//! |-------------|-------------------------|---------------------------|
//! | `hardware`  | IndicatorPort           | Status LEDs (GPIO)        |
//! |             | ServoPort               | Servo (LEDC PWM)          |
//! | `log_sink`  | EventSink               | Serial log output         |
//! | `nvs`       | ConfigPort              | NVS / in-memory store     |
//! | `tcp`       | Connector               | lwIP / host TCP           |
//! | `time`      | DelayNs                 | FreeRTOS / thread sleep   |
//! | `wifi`      | NetworkPort             | ESP-IDF WiFi STA          |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod tcp;
pub mod time;
pub mod wifi;
