/// Fixed-rate, fully amortizing monthly payment.
///
/// `annual_rate` is a fraction (0.07 for 7%). A zero rate amortizes the principal
/// linearly; a non-positive loan amount or term carries no debt service.
pub fn monthly_payment(loan_amount: f64, annual_rate: f64, term_years: u32) -> f64 {
    let n = term_years.saturating_mul(12);
    if loan_amount <= 0.0 || n == 0 {
        return 0.0;
    }

    let periods = f64::from(n);
    if annual_rate == 0.0 {
        return loan_amount / periods;
    }

    // Discount form: stays finite when (1 + r)^n overflows and tends to `loan * r`.
    let r = annual_rate / 12.0;
    let discount = (1.0 + r).powf(-periods);
    loan_amount * r / (1.0 - discount)
}
