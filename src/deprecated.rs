//! Old entry points kept for callers that haven't moved on yet. Each one
//! records a [`Notice::Deprecated`](crate::Notice::Deprecated) and delegates.

use crate::emit::Emission;
use crate::notice::VERSION;
use crate::scripts::{List, Scripts};

impl Scripts {
    #[deprecated(since = "0.1.0", note = "use `script_is(handle, List::Enqueued)`")]
    pub fn is_script_enqueued(&mut self, handle: &str) -> bool {
        self.notices
            .deprecated_function("is_script_enqueued", VERSION, Some("script_is"));
        self.script_is(handle, List::Enqueued)
    }

    #[deprecated(since = "0.1.0", note = "use `do_head_items`")]
    pub fn print_head_scripts(&mut self) -> Vec<Emission> {
        self.notices
            .deprecated_function("print_head_scripts", VERSION, Some("do_head_items"));
        self.do_head_items()
    }

    #[deprecated(since = "0.1.0", note = "use `do_footer_items`")]
    pub fn print_footer_scripts(&mut self) -> Vec<Emission> {
        self.notices
            .deprecated_function("print_footer_scripts", VERSION, Some("do_footer_items"));
        self.do_footer_items()
    }
}
