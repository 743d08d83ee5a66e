use polyfactor::{decode, render_html};

const TRANSCRIPT: &str = "trace\nFactorization:\n(x-1)\n(x+1)\nTime: 0.003s\n";

const VERBOSE_TRANSCRIPT: &str = "Working precision: 64
==========
--> step <--
Factorization:
(x-1)
(x+1)
Time: 3ms
";

mod output_tests {
  use super::*;

  mod decoding {
    use super::*;

    #[test]
    fn factors_and_elapsed_time() {
      let result = decode(TRANSCRIPT);
      assert_eq!(result.factors, vec!["(x-1)", "(x+1)"]);
      assert_eq!(result.elapsed, "0.003s");
      assert_eq!(result.raw_text, TRANSCRIPT);
      assert!(result.found_marker());
    }

    #[test]
    fn only_the_last_marker_counts() {
      let result = decode(
        "Factorization: attempt 1\n(x^4+1)\nFactorization:\n(x^2+1)\nTime: 1ms",
      );
      assert_eq!(result.factors, vec!["(x^2+1)"]);
      assert_eq!(result.elapsed, "1ms");
    }

    #[test]
    fn blank_lines_are_skipped() {
      let result =
        decode("Factorization:\n\n(x-1)\n  \n(x+1)\n\nTime: 12ms\n \t\n");
      assert_eq!(result.factors, vec!["(x-1)", "(x+1)"]);
      assert_eq!(result.elapsed, "12ms");
    }

    #[test]
    fn factors_keep_program_order_and_duplicates() {
      let result = decode("Factorization:\n(x+1)\n(x-1)\n(x+1)\nTime: 1ms\n");
      assert_eq!(result.factors, vec!["(x+1)", "(x-1)", "(x+1)"]);
    }

    #[test]
    fn windows_line_endings() {
      let result = decode("Factorization:\r\n(x-1)\r\nTime: 4ms\r\n");
      assert_eq!(result.factors, vec!["(x-1)"]);
      assert_eq!(result.elapsed, "4ms");
    }

    #[test]
    fn elapsed_comes_after_last_colon() {
      let result = decode("Factorization:\n(x-1)\nTime: total: 5ms\n");
      assert_eq!(result.elapsed, "5ms");
    }

    #[test]
    fn missing_marker_degrades_to_empty_result() {
      let result = decode("Input error\nreason: bad coefficient\n");
      assert!(result.factors.is_empty());
      assert_eq!(result.elapsed, "bad coefficient");
      assert!(!result.found_marker());
    }

    #[test]
    fn empty_transcript() {
      let result = decode("");
      assert!(result.factors.is_empty());
      assert_eq!(result.elapsed, "");
    }
  }

  mod rendering {
    use super::*;

    #[test]
    fn compact_body_is_the_factor_list() {
      assert_eq!(
        render_html(TRANSCRIPT, false, false),
        "<html style=\"font-family: Courier New; font-size:12\">(x-1)(x+1)</html>"
      );
    }

    #[test]
    fn verbose_body_shows_the_trace() {
      insta::assert_snapshot!(
        render_html(VERBOSE_TRANSCRIPT, true, false),
        @r#"<html style="font-family: Courier New; font-size:12">Working precision: 64<br><hr><b>&gt;&gt;&nbsp; step &nbsp; &lt;&lt;</b><br><b>Factorization:<br>(x-1)<br>(x+1)<br>Time: 3ms<br></b></html>"#
      );
    }

    #[test]
    fn short_rules_are_not_dividers() {
      let html = render_html("=========\n", true, false);
      assert!(html.contains("=========<br>"));
      assert!(!html.contains("<hr>"));
    }

    #[test]
    fn long_divider_lines_collapse() {
      let rule = "=".repeat(96);
      let html = render_html(&format!("Begin\n{rule}\nEnd\n"), true, false);
      assert!(html.contains("Begin<br><hr>End<br>"));
    }

    #[test]
    fn trace_without_marker_has_no_bold_section() {
      let html = render_html("Polynomial input: x^2+1\n", true, false);
      assert!(!html.contains("<b>"));
      assert!(html.contains("Polynomial input: x^2+1<br>"));
    }

    #[test]
    fn failure_banner_in_every_mode() {
      for verbose in [true, false] {
        let html = render_html(TRANSCRIPT, verbose, true);
        assert!(html.contains("<h2> Factorization failed: </h2>"));
      }
    }

    #[test]
    fn diagnostic_text_is_escaped() {
      let html = render_html("coefficient <bad> & worse", true, true);
      assert!(html.contains("coefficient &lt;bad&gt; &amp; worse"));
    }
  }
}
