/*!

A stand-in used when the `logging` feature is off. Nothing is written anywhere, but the
public API keeps working and `log::max_level` still tracks the configured level.

*/

use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Applies this `LogConfiguration` to the `log` facade.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
