//! Device context and poll loop
//!
//! [`Device`] owns every piece of control-plane state. The firmware calls
//! [`Device::poll`] once per loop iteration; each call runs one tick in a
//! fixed order:
//!
//! 1. drain serial input and dispatch complete lines
//! 2. sample buttons and apply their bindings
//! 3. advance the drop controller by at most one phase
//! 4. tick the wall clock
//! 5. send the beacon and check host liveness
//! 6. start the next queued module if idle
//! 7. return a view if the screen is due for a redraw
//!
//! Nothing in a tick blocks except persistent store writes, which wait
//! for the device to commit.

use core::fmt::{self, Write};

use heapless::Vec;
use pillex_hal::{Level, UartRx};
use pillex_protocol::{
    emit, parse, ButtonId, Command, DeviceEvent, I2cDevices, LineBuffer, MemRow, ParseError,
    PressKind, ScreenId, SensorStates, TimeSet, LINE_END, MEM_ROW_LEN,
};

use crate::clock::{TimeOfDay, WallClock};
use crate::config::DeviceConfig;
use crate::dispense::{
    ActuatorCommand, Actuators, DispenseQueue, DropController, DropOutcome, DropStep, ModuleId,
    MODULE_COUNT,
};
use crate::input::{ButtonController, ButtonEventKind, BUTTON_COUNT};
use crate::safety::{HeartbeatMonitor, LivenessStatus};
use crate::screen::{ScreenController, View};
use crate::traits::{BusScanner, ExpanderPort, PersistentStore};

/// Bytes taken from the UART per tick at most
pub const MAX_RX_BYTES_PER_POLL: usize = 256;

/// Length of the cartridge identifier at the start of the store
pub const CARTRIDGE_ID_LEN: usize = 8;

/// First and last address probed by `i2c`
const SCAN_FIRST: u8 = 1;
const SCAN_LAST: u8 = 126;

const MEM_RANGE_REPLY: &str = "Address out of range";

/// Errors that stop the device from starting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// The expander did not accept its configuration
    Expander,
}

/// The dispenser
pub struct Device<E, S, B> {
    config: DeviceConfig,
    actuators: Actuators<E>,
    store: S,
    scanner: B,
    rx_line: LineBuffer,
    drop: DropController,
    queue: DispenseQueue,
    buttons: ButtonController,
    screen: ScreenController,
    heartbeat: HeartbeatMonitor,
    clock: WallClock,
    /// Error screen currently showing was forced by host silence
    liveness_screen: bool,
    io_faults: u32,
}

impl<E, S, B> Device<E, S, B>
where
    E: ExpanderPort,
    S: PersistentStore,
    B: BusScanner,
{
    /// Assemble a device; nothing touches the hardware until [`boot`](Self::boot)
    pub fn new(config: DeviceConfig, expander: E, store: S, scanner: B, now: u32) -> Self {
        let timing = config.timing;
        Self {
            config,
            actuators: Actuators::new(expander),
            store,
            scanner,
            rx_line: LineBuffer::new(),
            drop: DropController::new(timing),
            queue: DispenseQueue::new(),
            buttons: ButtonController::new(timing),
            screen: ScreenController::new(timing),
            heartbeat: HeartbeatMonitor::new(&timing, now),
            clock: WallClock::new(now),
            liveness_screen: false,
            io_faults: 0,
        }
    }

    /// Configure the expander and announce the device
    ///
    /// The liveness and beacon windows start at `now`.
    pub fn boot<W: Write>(&mut self, now: u32, out: &mut W) -> Result<(), BootError> {
        self.actuators.init().map_err(|_| BootError::Expander)?;
        self.heartbeat.reset(now);
        self.clock = WallClock::new(now);
        send(out, DeviceEvent::Init);
        Ok(())
    }

    /// Run one tick
    ///
    /// `buttons` are the raw levels in [`ButtonId::ALL`] order. Returns the
    /// view to draw when the screen is due for a redraw.
    pub fn poll<R, W>(
        &mut self,
        now: u32,
        rx: &mut R,
        buttons: [Level; BUTTON_COUNT],
        out: &mut W,
    ) -> Option<View<'_>>
    where
        R: UartRx,
        W: Write,
    {
        self.poll_serial(now, rx, out);
        self.poll_buttons(now, buttons, out);
        self.poll_drop(now, out);
        self.clock.tick(now);
        self.poll_heartbeat(now, out);
        self.auto_pick(now, out);

        if let Some(event) = self.screen.tick(now) {
            self.liveness_screen = false;
            send(out, event);
        }
        let time = self.clock.time();
        self.screen.render(now, time)
    }

    // ---- accessors ----

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn queue(&self) -> &DispenseQueue {
        &self.queue
    }

    pub fn drop_controller(&self) -> &DropController {
        &self.drop
    }

    pub fn screen(&self) -> &ScreenController {
        &self.screen
    }

    pub fn heartbeat(&self) -> &HeartbeatMonitor {
        &self.heartbeat
    }

    pub fn time(&self) -> TimeOfDay {
        self.clock.time()
    }

    /// Expander operations that failed since boot
    pub fn io_faults(&self) -> u32 {
        self.io_faults
    }

    /// Identifier stored in the first bytes of the persistent store
    pub fn cartridge_id(&mut self) -> [u8; CARTRIDGE_ID_LEN] {
        let mut id = [0u8; CARTRIDGE_ID_LEN];
        for (addr, byte) in id.iter_mut().enumerate() {
            *byte = self.store.read_byte(addr as u16);
        }
        id
    }

    /// Access the expander port
    pub fn expander_mut(&mut self) -> &mut E {
        self.actuators.port_mut()
    }

    /// Access the persistent store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // ---- tick steps ----

    fn poll_serial<R: UartRx, W: Write>(&mut self, now: u32, rx: &mut R, out: &mut W) {
        for _ in 0..MAX_RX_BYTES_PER_POLL {
            let byte = match rx.try_read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) | Err(_) => break,
            };
            if let Some(line) = self.rx_line.feed(byte) {
                match line.as_str() {
                    Some(text) => self.dispatch(now, text, out),
                    None => reply(out, ParseError::UnknownVerb.reply()),
                }
            }
        }
    }

    fn poll_buttons<W: Write>(&mut self, now: u32, levels: [Level; BUTTON_COUNT], out: &mut W) {
        for event in self.buttons.update(now, levels) {
            match event.kind {
                ButtonEventKind::Pressed => {
                    if event.button == ButtonId::Ok && self.screen.current() == ScreenId::PillStuck
                    {
                        self.restart_last_drop(now, out);
                    }
                }
                ButtonEventKind::Press(press) => {
                    send(
                        out,
                        DeviceEvent::Button {
                            button: event.button,
                            press,
                        },
                    );
                    if press == PressKind::Long {
                        self.long_press(now, event.button, out);
                    }
                }
            }
        }
    }

    fn long_press<W: Write>(&mut self, now: u32, button: ButtonId, out: &mut W) {
        match button {
            ButtonId::Ok => self.set_screen(ScreenId::Time, now, out),
            ButtonId::Down => {
                if let Some(first) = ModuleId::new(0) {
                    self.queue.enqueue(first, 1);
                }
            }
            ButtonId::Back | ButtonId::Up => {}
        }
    }

    fn restart_last_drop<W: Write>(&mut self, now: u32, out: &mut W) {
        let Some(module) = self.drop.last_module() else {
            return;
        };
        if let Some(step) = self.drop.start(module, now) {
            self.apply(module, &step);
            self.set_screen(ScreenId::Loading, now, out);
        }
    }

    fn poll_drop<W: Write>(&mut self, now: u32, out: &mut W) {
        let Some(module) = self.drop.session().map(|s| s.module()) else {
            return;
        };
        let reading = if self.drop.needs_sensor() {
            Some(self.read_sensor(module))
        } else {
            None
        };
        let step = self.drop.advance(now, reading);
        self.apply(module, &step);

        match step.outcome {
            Some(DropOutcome::Dispensed(module)) => {
                self.queue.record_dispensed(module);
                self.screen.arm_success_timeout(now);
                if self.queue.total_queued() == 0 {
                    send(out, DeviceEvent::DropOk);
                    self.set_screen(ScreenId::Success, now, out);
                }
            }
            Some(DropOutcome::Stuck(_)) => {
                send(out, DeviceEvent::DropFail);
                self.set_screen(ScreenId::PillStuck, now, out);
            }
            None => {}
        }
    }

    fn poll_heartbeat<W: Write>(&mut self, now: u32, out: &mut W) {
        if let Some(millis) = self.heartbeat.beacon_due(now) {
            send(out, DeviceEvent::TimeBeacon(millis));
        }
        let code = self.config.hardware.liveness_fault_code;
        match self.heartbeat.check(now) {
            LivenessStatus::Lost => {
                send(out, self.screen.show_error(code, now));
                self.liveness_screen = true;
            }
            // Reported once per episode; later screen changes are undone quietly
            LivenessStatus::Latched if self.screen.current() != ScreenId::Error => {
                let _ = self.screen.show_error(code, now);
                self.liveness_screen = true;
            }
            LivenessStatus::Latched | LivenessStatus::Ok => {}
        }
    }

    fn auto_pick<W: Write>(&mut self, now: u32, out: &mut W) {
        if !self.drop.is_idle() || self.screen.current().blocks_dispensing() {
            return;
        }
        let Some(module) = self.queue.next_pending() else {
            return;
        };
        if let Some(step) = self.drop.start(module, now) {
            self.apply(module, &step);
            if self.screen.current() != ScreenId::Loading {
                self.set_screen(ScreenId::Loading, now, out);
            }
        }
    }

    // ---- command dispatch ----

    fn dispatch<W: Write>(&mut self, now: u32, line: &str, out: &mut W) {
        let command = match parse(line) {
            Ok(command) => command,
            Err(ParseError::Empty) => return,
            Err(err) => {
                reply(out, err.reply());
                return;
            }
        };

        match command {
            Command::SetTime {
                hours,
                minutes,
                seconds,
            } => {
                let time = TimeOfDay {
                    hours,
                    minutes,
                    seconds,
                };
                self.clock.set(time, now);
                let recovered = self.heartbeat.host_seen(now);
                reply(
                    out,
                    TimeSet {
                        hours,
                        minutes,
                        seconds,
                    },
                );
                if recovered && self.liveness_screen && self.screen.current() == ScreenId::Error {
                    self.set_screen(ScreenId::Time, now, out);
                }
            }
            Command::MemDump => {
                let capacity = self.store.capacity();
                self.mem_rows(0, capacity, out);
            }
            Command::MemRead { addr, len } => {
                if addr >= self.store.capacity() {
                    reply(out, MEM_RANGE_REPLY);
                } else {
                    self.mem_rows(addr, len, out);
                }
            }
            Command::MemWrite { addr, values } => {
                let end = u32::from(addr) + values.len() as u32;
                if end > u32::from(self.store.capacity()) {
                    reply(out, MEM_RANGE_REPLY);
                    return;
                }
                for (offset, value) in values.iter().enumerate() {
                    self.store.write_byte(addr + offset as u16, *value);
                }
                self.mem_rows(addr, values.len() as u16, out);
            }
            Command::Message(text) => {
                let stored = self.screen.set_message(text);
                reply(out, stored);
            }
            Command::ShowError(code) => {
                let event = self.screen.show_error(code, now);
                self.liveness_screen = false;
                send(out, event);
            }
            Command::Screen(screen) => self.set_screen(screen, now, out),
            Command::I2cScan => {
                let mut found: Vec<u8, { SCAN_LAST as usize }> = Vec::new();
                for addr in SCAN_FIRST..=SCAN_LAST {
                    if self.scanner.probe(addr) {
                        let _ = found.push(addr);
                    }
                }
                reply(out, I2cDevices(&found));
            }
            Command::Drop { module } => {
                if let Some(module) = ModuleId::new(module) {
                    self.queue.enqueue(module, 1);
                }
            }
            Command::DropAll(counts) => self.queue.set_all(counts),
            Command::Sensors => {
                let mut states = [false; MODULE_COUNT];
                for module in ModuleId::all() {
                    states[module.index()] = self.read_sensor(module);
                }
                reply(out, SensorStates(states));
            }
        }
    }

    /// Reply with `$MEM` rows covering `len` bytes from `start`, clipped
    /// to the store
    fn mem_rows<W: Write>(&mut self, start: u16, len: u16, out: &mut W) {
        let end = (u32::from(start) + u32::from(len)).min(u32::from(self.store.capacity()));
        let mut addr = u32::from(start);
        while addr < end {
            let row_end = (addr + MEM_ROW_LEN as u32).min(end);
            let mut bytes = [0u8; MEM_ROW_LEN];
            let count = (row_end - addr) as usize;
            for (i, byte) in bytes[..count].iter_mut().enumerate() {
                *byte = self.store.read_byte((addr as usize + i) as u16);
            }
            reply(
                out,
                MemRow {
                    addr: addr as u16,
                    bytes: &bytes[..count],
                },
            );
            addr = row_end;
        }
    }

    // ---- helpers ----

    fn set_screen<W: Write>(&mut self, screen: ScreenId, now: u32, out: &mut W) {
        self.liveness_screen = false;
        send(out, self.screen.set(screen, now));
    }

    /// Sensor reading; a failed read counts as no pill
    fn read_sensor(&mut self, module: ModuleId) -> bool {
        match self.actuators.pill_present(module) {
            Ok(present) => present,
            Err(_) => {
                self.io_faults = self.io_faults.saturating_add(1);
                false
            }
        }
    }

    fn apply(&mut self, module: ModuleId, step: &DropStep) {
        for command in step.commands.iter().copied() {
            self.apply_command(module, command);
        }
    }

    fn apply_command(&mut self, module: ModuleId, command: ActuatorCommand) {
        if self.actuators.apply(module, command).is_err() {
            self.io_faults = self.io_faults.saturating_add(1);
        }
    }
}

/// Emit an event; a lost status line is not an error for the caller
fn send<W: Write>(out: &mut W, event: DeviceEvent) {
    let _ = emit(out, event);
}

fn reply<W: Write>(out: &mut W, line: impl fmt::Display) {
    let _ = write!(out, "{}{}", line, LINE_END);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExpander, MockScanner, MockStore};
    use std::collections::VecDeque;
    use std::string::String;

    const UP: [Level; 4] = [Level::High; 4];

    struct ScriptRx(VecDeque<u8>);

    impl ScriptRx {
        fn new() -> Self {
            Self(VecDeque::new())
        }

        fn send(&mut self, line: &str) {
            self.0.extend(line.bytes());
            self.0.push_back(b'\n');
        }
    }

    impl UartRx for ScriptRx {
        type Error = ();

        fn try_read_byte(&mut self) -> Result<Option<u8>, ()> {
            Ok(self.0.pop_front())
        }
    }

    type TestDevice = Device<MockExpander, MockStore, MockScanner>;

    fn device() -> (TestDevice, String) {
        let mut dev = Device::new(
            DeviceConfig::default(),
            MockExpander::new(),
            MockStore::new(),
            MockScanner::with(&[0x20, 0x3C, 0x50]),
            0,
        );
        let mut out = String::new();
        dev.boot(0, &mut out).unwrap();
        (dev, out)
    }

    fn command(dev: &mut TestDevice, now: u32, line: &str) -> String {
        let mut rx = ScriptRx::new();
        rx.send(line);
        let mut out = String::new();
        dev.poll(now, &mut rx, UP, &mut out);
        out
    }

    fn idle(dev: &mut TestDevice, now: u32) -> String {
        let mut out = String::new();
        dev.poll(now, &mut ScriptRx::new(), UP, &mut out);
        out
    }

    fn m(i: u8) -> ModuleId {
        ModuleId::new(i).unwrap()
    }

    #[test]
    fn test_boot_announces_and_configures() {
        let (mut dev, out) = device();
        assert_eq!(out, "$init\r\n");
        assert_eq!(dev.expander_mut().outputs_mask(), 0x7777);
        assert_eq!(dev.screen().current(), ScreenId::Time);
    }

    #[test]
    fn test_unknown_verb_replies_without_state_change() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "dance");
        assert!(out.starts_with("Unknown command"));
        assert_eq!(dev.queue().queued_all(), [0; 4]);
    }

    #[test]
    fn test_drp_out_of_range_rejected() {
        let (mut dev, _) = device();
        command(&mut dev, 10, "drpall 1 1 1 1");
        let before = dev.queue().queued_all();
        // Hold the queue still by faulting the screen
        command(&mut dev, 11, "screen PILL_STUCK");
        let out = command(&mut dev, 12, "drp 0");
        assert_eq!(out, "Invalid module, expected 1..4\r\n");
        command(&mut dev, 13, "drp 5");
        assert_eq!(dev.queue().queued_all(), before);
    }

    #[test]
    fn test_drpall_sets_queues() {
        let (mut dev, _) = device();
        command(&mut dev, 10, "screen ERROR");
        command(&mut dev, 11, "drpall 2 0 1 0");
        assert_eq!(dev.queue().queued_all(), [2, 0, 1, 0]);
    }

    #[test]
    fn test_drp_starts_loading() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "drp 2");
        assert_eq!(out, "$screen LOADING\r\n");
        assert_eq!(dev.drop_controller().session().unwrap().module(), m(1));
        assert!(dev.expander_mut().line(m(1).lines().forward));
    }

    #[test]
    fn test_time_sets_clock_and_replies() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "time 07 30 00");
        assert_eq!(out, "Time set to 07:30:00\r\n");
        idle(&mut dev, 2_010);
        assert_eq!(
            dev.time(),
            TimeOfDay {
                hours: 7,
                minutes: 30,
                seconds: 2
            }
        );
    }

    #[test]
    fn test_beacon_every_ten_seconds() {
        let (mut dev, _) = device();
        assert_eq!(idle(&mut dev, 9_999), "");
        assert_eq!(idle(&mut dev, 10_000), "$time 10000\r\n");
    }

    #[test]
    fn test_liveness_fault_once_and_recovery() {
        let (mut dev, _) = device();
        let out = idle(&mut dev, 60_000);
        assert!(out.contains("$screen ERROR\r\n"));
        assert_eq!(dev.screen().error_code(), 1);
        assert!(!idle(&mut dev, 61_000).contains("$screen"));
        assert!(!idle(&mut dev, 200_000).contains("$screen ERROR"));

        let out = command(&mut dev, 200_001, "time 10 00 00");
        assert_eq!(out, "Time set to 10:00:00\r\n$screen TIME\r\n");

        let out = idle(&mut dev, 260_001);
        assert!(out.contains("$screen ERROR\r\n"));
    }

    #[test]
    fn test_liveness_fault_outlasts_drop_finishing_in_silence() {
        let (mut dev, _) = device();
        dev.expander_mut().set_pill(m(0), true);
        command(&mut dev, 59_900, "drpall 3 0 0 0");
        assert!(!dev.drop_controller().is_idle());

        let mut out = String::new();
        let mut now = 59_900;
        while !out.contains("$drp") {
            now += 10;
            out.push_str(&idle(&mut dev, now));
            assert!(now < 70_000);
        }
        // The pill never leaves the chamber, so the drop fails
        assert!(out.contains("$screen ERROR\r\n"));
        assert!(out.contains("$drp fail\r\n$screen PILL_STUCK\r\n"));
        assert_eq!(dev.screen().current(), ScreenId::Error);
        assert_eq!(dev.screen().error_code(), 1);

        let out = idle(&mut dev, 120_000);
        assert!(!out.contains("$screen"));
        assert_eq!(dev.screen().current(), ScreenId::Error);
        assert!(dev.drop_controller().is_idle());
        assert_eq!(dev.queue().queued(m(0)), 3);

        let out = command(&mut dev, 120_001, "time 10 00 00");
        assert!(out.ends_with("$screen TIME\r\n"));
    }

    #[test]
    fn test_liveness_fault_reasserts_over_forced_screen() {
        let (mut dev, _) = device();
        idle(&mut dev, 60_000);
        command(&mut dev, 60_001, "screen SUCCESS");
        assert_eq!(dev.screen().current(), ScreenId::Error);
        assert_eq!(idle(&mut dev, 70_001), "$time 70001\r\n");
        assert_eq!(dev.screen().current(), ScreenId::Error);
    }

    #[test]
    fn test_time_does_not_clear_host_error() {
        let (mut dev, _) = device();
        idle(&mut dev, 60_000);
        command(&mut dev, 60_001, "err 9");
        let out = command(&mut dev, 60_002, "time 10 00 00");
        assert_eq!(out, "Time set to 10:00:00\r\n");
        assert_eq!(dev.screen().current(), ScreenId::Error);
        assert_eq!(dev.screen().error_code(), 9);
    }

    #[test]
    fn test_msg_sets_payload_and_echoes() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "msg Dose missed! 08:30");
        assert_eq!(out, "Dose missed! 08:30\r\n");
        assert_eq!(dev.screen().message(), "Dose missed! 08:30");
        assert_eq!(dev.screen().current(), ScreenId::Time);
    }

    #[test]
    fn test_err_switches_screen() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "err 42");
        assert_eq!(out, "$screen ERROR\r\n");
        assert_eq!(dev.screen().error_code(), 42);
    }

    #[test]
    fn test_screen_bad_name() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "screen NOPE");
        assert!(out.starts_with("Unknown screen"));
        assert_eq!(dev.screen().current(), ScreenId::Time);
    }

    #[test]
    fn test_mem_write_then_read() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "mem -w 10 DE AD BE EF");
        assert_eq!(out, "$MEM 0x10: DE AD BE EF\r\n");
        let out = command(&mut dev, 11, "mem -r 0 f");
        assert_eq!(
            out,
            "$MEM 0x00: 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00\r\n"
        );
        let out = command(&mut dev, 12, "mem -r 0e 4");
        assert_eq!(out, "$MEM 0x0E: 00 00 DE AD\r\n");
    }

    #[test]
    fn test_mem_dump_covers_store() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "mem");
        assert_eq!(out.lines().count(), 16);
        assert!(out.lines().last().unwrap().starts_with("$MEM 0xF0:"));
    }

    #[test]
    fn test_mem_range_checks() {
        let (mut dev, _) = device();
        assert_eq!(command(&mut dev, 10, "mem -r 100"), "Address out of range\r\n");
        assert_eq!(command(&mut dev, 11, "mem -w ff 1 2"), "Address out of range\r\n");
        let out = command(&mut dev, 12, "mem -r f8 20");
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_cartridge_id() {
        let (mut dev, _) = device();
        command(&mut dev, 10, "mem -w 0 01 02 03 04 05 06 07 08 09");
        assert_eq!(dev.cartridge_id(), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_i2c_scan() {
        let (mut dev, _) = device();
        let out = command(&mut dev, 10, "i2c");
        assert_eq!(out, "$I2C devices: [0x20,0x3C,0x50] = 3\r\n");
    }

    #[test]
    fn test_sensor_report() {
        let (mut dev, _) = device();
        dev.expander_mut().set_pill(m(0), true);
        dev.expander_mut().set_pill(m(3), true);
        let out = command(&mut dev, 10, "sns");
        assert_eq!(out, "$States: FULL EMPTY EMPTY FULL\r\n");
    }

    #[test]
    fn test_failed_sensor_read_counts_fault() {
        let (mut dev, _) = device();
        dev.expander_mut().fail_reads = true;
        let out = command(&mut dev, 10, "sns");
        assert_eq!(out, "$States: EMPTY EMPTY EMPTY EMPTY\r\n");
        assert_eq!(dev.io_faults(), 4);
    }

    #[test]
    fn test_fault_screen_blocks_auto_pick() {
        let (mut dev, _) = device();
        command(&mut dev, 10, "screen PILL_STUCK");
        command(&mut dev, 11, "drp 1");
        idle(&mut dev, 100);
        assert!(dev.drop_controller().is_idle());
        command(&mut dev, 200, "screen TIME");
        assert!(!dev.drop_controller().is_idle());
    }

    #[test]
    fn test_buttons_short_and_long() {
        let (mut dev, _) = device();
        let mut rx = ScriptRx::new();
        let mut out = String::new();
        let back = [Level::High, Level::Low, Level::High, Level::High];
        dev.poll(100, &mut rx, back, &mut out);
        dev.poll(150, &mut rx, back, &mut out);
        dev.poll(300, &mut rx, UP, &mut out);
        dev.poll(350, &mut rx, UP, &mut out);
        assert_eq!(out, "$Button BACK short press\r\n");

        out.clear();
        let down = [Level::High, Level::High, Level::High, Level::Low];
        dev.poll(1_000, &mut rx, down, &mut out);
        dev.poll(1_050, &mut rx, down, &mut out);
        dev.poll(2_050, &mut rx, down, &mut out);
        assert!(out.starts_with("$Button DOWN long press\r\n"));
        // Long DOWN queued a pill for module 1, auto-picked in the same tick
        assert!(out.ends_with("$screen LOADING\r\n"));
        assert_eq!(dev.drop_controller().session().unwrap().module(), m(0));
    }

    #[test]
    fn test_long_ok_forces_time() {
        let (mut dev, _) = device();
        command(&mut dev, 10, "err 3");
        let mut rx = ScriptRx::new();
        let mut out = String::new();
        let ok = [Level::Low, Level::High, Level::High, Level::High];
        dev.poll(100, &mut rx, ok, &mut out);
        dev.poll(150, &mut rx, ok, &mut out);
        dev.poll(1_150, &mut rx, ok, &mut out);
        assert_eq!(out, "$Button OK long press\r\n$screen TIME\r\n");
    }

    #[test]
    fn test_drop_failure_then_ok_restart() {
        let (mut dev, _) = device();
        command(&mut dev, 0, "drp 3");
        // No pill ever seen: close, five vibrate retries, open, finish
        let mut out = String::new();
        let mut now = 0;
        while !out.contains("$drp fail") {
            now += 10;
            out.push_str(&idle(&mut dev, now));
            assert!(now < 10_000);
        }
        assert!(out.ends_with("$drp fail\r\n$screen PILL_STUCK\r\n"));
        assert_eq!(dev.queue().queued(m(2)), 1);
        assert_eq!(dev.queue().counters(m(2)).dispensed, 0);

        let mut rx = ScriptRx::new();
        let mut out = String::new();
        let ok = [Level::Low, Level::High, Level::High, Level::High];
        dev.poll(now + 10, &mut rx, ok, &mut out);
        dev.poll(now + 60, &mut rx, ok, &mut out);
        assert_eq!(out, "$screen LOADING\r\n");
        assert_eq!(dev.drop_controller().session().unwrap().module(), m(2));
    }

    #[test]
    fn test_expander_write_faults_do_not_abort_session() {
        let (mut dev, _) = device();
        dev.expander_mut().fail_writes = true;
        command(&mut dev, 0, "drp 1");
        assert_eq!(dev.io_faults(), 1);
        idle(&mut dev, 250);
        assert_eq!(
            dev.drop_controller().phase(),
            crate::dispense::DropPhase::CheckSensor
        );
    }

    #[test]
    fn test_render_after_screen_change() {
        let (mut dev, _) = device();
        let mut out = String::new();
        assert_eq!(
            dev.poll(0, &mut ScriptRx::new(), UP, &mut out),
            Some(View::Time(TimeOfDay::default()))
        );
        assert!(dev.poll(10, &mut ScriptRx::new(), UP, &mut out).is_none());
        let mut rx = ScriptRx::new();
        rx.send("screen TAKE_PILL");
        assert_eq!(dev.poll(20, &mut rx, UP, &mut out), Some(View::TakePill));
    }
}
