/// How a question is answered and what the answer key looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    SingleChoice { correct: &'static str },
    MultipleChoice { correct: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionQuestion {
    pub id: &'static str,
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub kind: QuestionKind,
}

impl AdmissionQuestion {
    pub fn is_multiple_choice(&self) -> bool {
        matches!(self.kind, QuestionKind::MultipleChoice { .. })
    }

    pub fn correct_options(&self) -> Vec<&'static str> {
        match self.kind {
            QuestionKind::SingleChoice { correct } => vec![correct],
            QuestionKind::MultipleChoice { correct } => correct.to_vec(),
        }
    }
}

const GRATITUDE_AND_IMPROVEMENT: &str =
    "الامتنان للتقييمات الإيجابية والاستفادة من التقييمات السلبية لتحسين المشاريع المستقبلية";
const REGULAR_COMMUNICATION: &str =
    "التواصل بانتظام والاستماع بفعالية لاحتياجاتهم وتقديم عمل متقن";
const CLEAR_UNDERSTANDING: &str = "إظهار فهم واضح مع العميل تم الاتفاق مع بعد بدء التنفيذ";
const UNQUALIFIED_BIDS: &str = "التقدم على مستقل لا نتقن العمل عليها";
const UNCLEAR_AGREEMENT: &str = "إبرام اتفاق غير واضح مع العميل تم الاتفاق معه بعد بدء التنفيذ";
const LATE_DELIVERY: &str = "التأثر بتسليم المشروع";

/// The fixed admission quiz every freelancer takes.
pub const ADMISSION_QUESTIONS: [AdmissionQuestion; 4] = [
    AdmissionQuestion {
        id: "reviews_handling",
        prompt: "كيف تتعامل مع التقييمات العملاء؟",
        options: &[
            "عدم الاهتمام بالتقييمات السلبية وتجاهلها",
            "الرد بشكل دفاعي على التقييمات السلبية وإظهار الخطأ في تقييم العميل",
            "التواصل مع الدعم الفني وطلب حذف التقييمات السلبية",
            GRATITUDE_AND_IMPROVEMENT,
        ],
        kind: QuestionKind::SingleChoice {
            correct: GRATITUDE_AND_IMPROVEMENT,
        },
    },
    AdmissionQuestion {
        id: "client_relationships",
        prompt: "كيف تبني علاقات ناجحة وطويلة الأمد مع عملائك؟",
        options: &[
            "إكمال المشاريع في أسرع وقت ممكن حتى لو كان ذلك يعني المساومة على الجودة",
            REGULAR_COMMUNICATION,
            "تجاهل ملاحظات العملاء واتخاذ القرارات بناءً على تفضيلاتك وخبرتك فقط",
            GRATITUDE_AND_IMPROVEMENT,
        ],
        kind: QuestionKind::SingleChoice {
            correct: REGULAR_COMMUNICATION,
        },
    },
    AdmissionQuestion {
        id: "project_priority",
        prompt: "أي من الأمور التالية يجب أن تعطي الأولوية عند التقدم إلى مشروع؟",
        options: &[
            "تقديم عرض عام دون تخصيصه",
            "تقديم معلومات عامة عن مهاراتك حتى لو لم تكن متعلقة بالمشروع",
            CLEAR_UNDERSTANDING,
            "تحديد ميزانية منخفضة لزيادة فرصة الاختيار",
        ],
        kind: QuestionKind::SingleChoice {
            correct: CLEAR_UNDERSTANDING,
        },
    },
    AdmissionQuestion {
        id: "negative_reviews_causes",
        prompt: "ما أسباب الحصول على تقييمات سلبية؟",
        options: &[
            UNQUALIFIED_BIDS,
            "الاهتمام بملاحظات العملاء والانفتاح على المراجعات أو التحسينات",
            UNCLEAR_AGREEMENT,
            LATE_DELIVERY,
        ],
        kind: QuestionKind::MultipleChoice {
            correct: &[UNQUALIFIED_BIDS, UNCLEAR_AGREEMENT, LATE_DELIVERY],
        },
    },
];
