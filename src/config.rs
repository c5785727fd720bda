//! Knobs shared by the compiler and the virtual machine.

/// Default maximum depth of the virtual machine's operand stack.
pub const STACK_MAX: usize = 256;

/// Interpreter configuration.
///
/// # Examples
///
/// ```
/// use loxcalc::Config;
///
/// let config = Config::default().with_stack_max(16).with_trace_execution(true);
/// assert_eq!(config.stack_max, 16);
/// assert!(config.trace_execution);
/// assert!(!config.print_code);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of values the operand stack can hold
    pub stack_max: usize,
    /// Log the stack and every instruction before it is executed
    pub trace_execution: bool,
    /// Log the disassembled chunk after a successful compilation
    pub print_code: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stack_max: STACK_MAX,
            trace_execution: false,
            print_code: false,
        }
    }
}

impl Config {
    /// Set the maximum stack depth.
    pub fn with_stack_max(mut self, stack_max: usize) -> Self {
        self.stack_max = stack_max;
        self
    }

    /// Turn execution tracing on or off.
    pub fn with_trace_execution(mut self, trace_execution: bool) -> Self {
        self.trace_execution = trace_execution;
        self
    }

    /// Turn code printing on or off.
    pub fn with_print_code(mut self, print_code: bool) -> Self {
        self.print_code = print_code;
        self
    }
}
