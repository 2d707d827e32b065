//! Options and sampling behind the "Plot" button.
//!
//! The window itself is not part of this crate; it keeps a [`PlotOptions`],
//! turns it into a [`PlotRequest`] when the user asks for a plot and draws the
//! points returned by [`PlotRequest::sample`].

use crate::ast::{parse_expression, Bindings, Expression};
use crate::error::{EvalError, ParseError};
use log::{debug, info};
use rayon::prelude::*;
use std::fmt;
use thiserror::Error;

/// The variable a plotted function is written in.
pub const PLOT_VARIABLE: &str = "x";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error("{axis} minimum ({min}) must be less than {axis} maximum ({max}).")]
    EmptyRange { axis: Axis, min: f64, max: f64 },

    #[error("At least two samples are needed to plot, got {0}.")]
    NotEnoughSamples(usize),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// A single labelled setting with a default that applies until it is set.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOption<T> {
    label: &'static str,
    current: Option<T>,
    default: T,
}

impl<T: Clone> PlotOption<T> {
    pub fn new(label: &'static str, default: T) -> Self {
        Self {
            label,
            current: None,
            default,
        }
    }

    pub fn set(&mut self, value: T) {
        self.current = Some(value);
    }

    /// The current value, or the default if the option is unset.
    pub fn get(&self) -> T {
        self.current.as_ref().unwrap_or(&self.default).clone()
    }

    /// Restores the default value.
    pub fn unset(&mut self) {
        self.current = None;
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// The five settings of the options panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub function: PlotOption<String>,
    pub x_min: PlotOption<f64>,
    pub x_max: PlotOption<f64>,
    pub y_min: PlotOption<f64>,
    pub y_max: PlotOption<f64>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            function: PlotOption::new("f(x) = ", String::new()),
            x_min: PlotOption::new("x minimum: ", -10.0),
            x_max: PlotOption::new("x maximum: ", 10.0),
            y_min: PlotOption::new("y minimum: ", -10.0),
            y_max: PlotOption::new("y maximum: ", 10.0),
        }
    }
}

impl PlotOptions {
    /// Labels in panel order.
    pub fn labels(&self) -> [&'static str; 5] {
        [
            self.function.label(),
            self.x_min.label(),
            self.x_max.label(),
            self.y_min.label(),
            self.y_max.label(),
        ]
    }

    pub fn request(&self) -> Result<PlotRequest, PlotError> {
        PlotRequest::new(
            &self.function.get(),
            self.x_min.get(),
            self.x_max.get(),
            self.y_min.get(),
            self.y_max.get(),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    /// `None` where the function is undefined or leaves the visible y range.
    pub y: Option<f64>,
}

/// A validated plot: a parsed function of `x` and a non-empty viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    function: Expression,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl PlotRequest {
    pub fn new(
        function: &str,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    ) -> Result<Self, PlotError> {
        let function = parse_expression(function)?;
        check_range(Axis::X, x_min, x_max)?;
        check_range(Axis::Y, y_min, y_max)?;

        if let Some(name) = function
            .variables()
            .into_iter()
            .find(|name| *name != PLOT_VARIABLE)
        {
            return Err(EvalError::UnboundVariable {
                name: name.to_string(),
            }
            .into());
        }

        info!(
            "Plotting {} over x in [{}, {}], y in [{}, {}]",
            function, x_min, x_max, y_min, y_max
        );
        Ok(Self {
            function,
            x_range: (x_min, x_max),
            y_range: (y_min, y_max),
        })
    }

    pub fn function(&self) -> &Expression {
        &self.function
    }

    pub fn x_range(&self) -> (f64, f64) {
        self.x_range
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    /// Evaluates the function at `samples` evenly spaced points from `x_min`
    /// to `x_max` inclusive.
    pub fn sample(&self, samples: usize) -> Result<Vec<PlotPoint>, PlotError> {
        if samples < 2 {
            return Err(PlotError::NotEnoughSamples(samples));
        }

        let (x_min, x_max) = self.x_range;
        let step = (x_max - x_min) / (samples - 1) as f64;
        debug!("Sampling {} points with step {}", samples, step);

        let points = (0..samples)
            .into_par_iter()
            .map(|i| {
                // Pin the last sample to the bound instead of accumulating rounding.
                let x = if i == samples - 1 {
                    x_max
                } else {
                    x_min + step * i as f64
                };
                let bindings = Bindings::from([(PLOT_VARIABLE.to_string(), x)]);
                let y = self.function.evaluate(&bindings)?;
                Ok(PlotPoint {
                    x,
                    y: self.visible(y),
                })
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        Ok(points)
    }

    fn visible(&self, y: f64) -> Option<f64> {
        let (y_min, y_max) = self.y_range;
        (y.is_finite() && y >= y_min && y <= y_max).then_some(y)
    }
}

fn check_range(axis: Axis, min: f64, max: f64) -> Result<(), PlotError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(PlotError::EmptyRange { axis, min, max })
    }
}
