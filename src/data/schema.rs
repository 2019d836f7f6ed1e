//! Survey Schema Module
//! Column headers of the questionnaire workbook and the names of derived columns.
//!
//! Header text is stored trimmed; the loader trims headers the same way, so a
//! stray trailing space in the workbook does not break the match.

/// "Do you use non-cash payment instruments?"
pub const USAGE_COL: &str = "Օգտվում ե՞ք անկանխիկ վճարամիջոցներից";
/// "You work as"
pub const EMPLOYMENT_COL: &str = "Աշխատում եք որպես";
pub const REGION_COL: &str = "Մարզ";
pub const GENDER_COL: &str = "Պատասխանողի սեռը";
pub const INCOME_COL: &str = "Ձեր միջին ամսական եկամտի միջնակայքը";
/// "If you had to keep all your money only in cash or only non-cash, which would you prefer"
pub const STORAGE_COL: &str = "Եթե Ձեր ամբողջ գումարը ստիպված լինեք պահել միայն կանխիկ կամ միայն անկանխիկ, ո՞ր եղանակը կնախընտրեիք";

/// Derived column names added by the pipeline.
pub const USAGE_TYPE: &str = "Usage Type";
pub const EMPLOYMENT_STATUS: &str = "Employment Status";
pub const REGION: &str = "Region";
pub const GENDER: &str = "Gender";
pub const INCOME_GROUP: &str = "Income Group";

/// Survey answer literals.
pub const ANSWER_YES: &str = "Այո";
pub const ANSWER_NO: &str = "Ոչ";
pub const ANSWER_NOT_WORKING: &str = "Չեմ աշխատում";

/// Multi-select "reason for not using non-cash" columns, one per reason.
pub const REASON_COLUMNS: [&str; 6] = [
    "Ի՞նչն է պատճառը, որ չեք օգտվում անկանխիկ վճարային ծառայություններից(Տեղեկատվության կամ գիտելիքի պակաս)",
    "Ի՞նչն է պատճառը, որ չեք օգտվում անկանխիկ վճարային ծառայություններից(Հեռախոսի կամ համակարգչի բացակայություն)",
    "Ի՞նչն է պատճառը, որ չեք օգտվում անկանխիկ վճարային ծառայություններից(Ինտերնետի հասանելիություն)",
    "Ի՞նչն է պատճառը, որ չեք օգտվում անկանխիկ վճարային ծառայություններից(Վստահելիության պակաս)",
    "Ի՞նչն է պատճառը, որ չեք օգտվում անկանխիկ վճարային ծառայություններից(Անվտանգություն)",
    "Ի՞նչն է պատճառը, որ չեք օգտվում անկանխիկ վճարային ծառայություններից(Սովորություն)",
];

/// Transaction types shared by the two payment channels.
pub const TRANSACTION_TYPES: [&str; 5] = [
    "Ներհայաստանյան փոխանցումներ",
    "Միջպետական փոխանցումներ",
    "Վճարումներ",
    "Օնլայն գնումներ",
    "Կոմունալների վճարում",
];

/// Mobile banking app columns, aligned with [`TRANSACTION_TYPES`].
///
/// The third header spells the payments option "Վաճարումներ" in the source workbook.
pub const BANKING_COLUMNS: [&str; 5] = [
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ բանկինգի բջջային հավելվածով(Ներհայաստանյան փոխանցումներ)",
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ բանկինգի բջջային հավելվածով(Միջպետական փոխանցումներ)",
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ բանկինգի բջջային հավելվածով(Վաճարումներ)",
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ բանկինգի բջջային հավելվածով(Օնլայն գնումներ)",
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ բանկինգի բջջային հավելվածով(Կոմունալների վճարում)",
];

/// E-wallet app columns, aligned with [`TRANSACTION_TYPES`].
pub const WALLET_COLUMNS: [&str; 5] = [
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ էլեկտրոնային դրամապանակ բջջային հավելվածներով(Ներհայաստանյան փոխանցումներ)",
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ էլեկտրոնային դրամապանակ բջջային հավելվածներով(Միջպետական փոխանցումներ)",
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ էլեկտրոնային դրամապանակ բջջային հավելվածներով(Վճարումներ)",
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ էլեկտրոնային դրամապանակ բջջային հավելվածներով(Օնլայն գնումներ)",
    "Խնդրում եմ թվարկեք այն անկանխիկ գործարքները, որոնք իրականացնում եք առցանց՝ էլեկտրոնային դրամապանակ բջջային հավելվածներով(Կոմունալների վճարում)",
];

/// Every column the pipeline reads from the raw table.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![
        USAGE_COL,
        EMPLOYMENT_COL,
        REGION_COL,
        GENDER_COL,
        INCOME_COL,
        STORAGE_COL,
    ];
    cols.extend(REASON_COLUMNS);
    cols.extend(BANKING_COLUMNS);
    cols.extend(WALLET_COLUMNS);
    cols
}

/// Short label of a multi-select column: the text inside the trailing parentheses.
pub fn option_label(column: &str) -> &str {
    match column.rsplit_once('(') {
        Some((_, tail)) => tail.trim_end_matches(')'),
        None => column,
    }
}
