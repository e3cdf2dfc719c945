//! Popover exclusivity view-model.
//!
//! The product editor shows several popovers (colour picker, size picker,
//! row menu, inline-create forms) with an "at most one open" rule,
//! historically enforced by ad hoc global flags and click-outside
//! listeners. Here it is a single `Option<PopoverMode>` with explicit
//! transitions; outside clicks and Escape both map to [`PopoverState::dismiss`].

/// Which exclusive popover is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopoverMode {
    ColourPicker,
    SizePicker,
    RowMenu,
    CreateFamily,
    CreateColourway,
}

/// At most one popover open at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopoverState {
    active: Option<PopoverMode>,
}

impl PopoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<PopoverMode> {
        self.active
    }

    pub fn is_open(&self, mode: PopoverMode) -> bool {
        self.active == Some(mode)
    }

    /// Open `mode`, implicitly closing whatever was open.
    pub fn open(&mut self, mode: PopoverMode) {
        self.active = Some(mode);
    }

    /// Toggle `mode`: close it if it is the open one, otherwise switch
    /// to it.
    pub fn toggle(&mut self, mode: PopoverMode) {
        self.active = if self.active == Some(mode) {
            None
        } else {
            Some(mode)
        };
    }

    /// Close whatever is open (outside interaction or Escape).
    pub fn dismiss(&mut self) {
        self.active = None;
    }
}
