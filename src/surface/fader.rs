//! Fader widget for ratatui
//!
//! One row per control: label, a bar filled to the smoothed value with a
//! marker at the target, and the numeric target.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::control::ParamView;
use crate::mapping::clamp;

const LABEL_WIDTH: u16 = 13;
const VALUE_WIDTH: u16 = 8;

/// Position of `value` within `[min, max]` as 0..1
pub fn fraction(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return 0.0;
    }
    clamp((value - min) / span, 0.0, 1.0)
}

/// A horizontal fader showing target and smoothed value
pub struct Fader<'a> {
    view: &'a ParamView,
    style: Style,
    selected: bool,
}

impl<'a> Fader<'a> {
    pub fn new(view: &'a ParamView) -> Self {
        Self {
            view,
            style: Style::default(),
            selected: false,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    fn render_fader(&self, area: Rect, buf: &mut Buffer) {
        if area.width <= LABEL_WIDTH + VALUE_WIDTH || area.height == 0 {
            return;
        }

        let label_style = if self.selected {
            self.style.add_modifier(Modifier::REVERSED)
        } else {
            self.style
        };
        let label = format!("{:<width$}", self.view.id.label(), width = LABEL_WIDTH as usize - 1);
        buf.set_stringn(area.x, area.y, label, LABEL_WIDTH as usize - 1, label_style);

        let bar_x = area.x + LABEL_WIDTH;
        let bar_width = area.width - LABEL_WIDTH - VALUE_WIDTH;
        let span = (bar_width - 1) as f64;

        let filled = (fraction(self.view.smoothed, self.view.min, self.view.max) * span).round() as u16;
        let marker = (fraction(self.view.target, self.view.min, self.view.max) * span).round() as u16;

        for i in 0..bar_width {
            let symbol = if i == marker {
                "┃"
            } else if i <= filled {
                "█"
            } else {
                "░"
            };
            buf.set_string(bar_x + i, area.y, symbol, self.style);
        }

        let value = format!(" {:>7.3}", self.view.target);
        buf.set_stringn(bar_x + bar_width, area.y, value, VALUE_WIDTH as usize, self.style);
    }
}

impl Widget for Fader<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_fader(area, buf);
    }
}
