// src/services/finance_service.rs

use chrono::{Months, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Datastore, UnitOfWork},
    models::finance::{
        ContaBancaria, CriarContaBancariaPayload, CriarTransacaoPayload, FiltroTransacoes,
        NovaContaBancaria, NovaParcela, NovaTransacao, PagarParcelaPayload, Parcela,
        ParcelaAtualizada, StatusTransacao, TipoTransacao, Transacao, TransacaoDetalhe,
    },
};

/// Status do pai a partir das parcelas: todas pagas -> pago, todas
/// canceladas -> cancelado, qualquer outra combinação (inclusive nenhuma
/// parcela) -> pendente.
pub fn derivar_status(parcelas: &[Parcela]) -> StatusTransacao {
    if parcelas.is_empty() {
        return StatusTransacao::Pendente;
    }
    if parcelas.iter().all(Parcela::esta_paga) {
        StatusTransacao::Pago
    } else if parcelas.iter().all(|p| p.status == StatusTransacao::Cancelado) {
        StatusTransacao::Cancelado
    } else {
        StatusTransacao::Pendente
    }
}

/// Divide o valor em `total` parcelas com centavos exatos; a última absorve
/// a sobra do arredondamento.
pub fn dividir_em_parcelas(valor: Decimal, total: u32) -> Vec<Decimal> {
    if total == 0 {
        return Vec::new();
    }
    let base = (valor / Decimal::from(total)).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut valores = vec![base; total as usize];
    let ultima = valor - base * Decimal::from(total - 1);
    if let Some(v) = valores.last_mut() {
        *v = ultima;
    }
    valores
}

// Valores monetários só até centavos; "10.500" conta como "10.5".
fn em_centavos(valor: Decimal) -> bool {
    valor.normalize().scale() <= 2
}

// Efeito no saldo ao pagar: receita entra, despesa sai.
// O procedimento debita, então receita vai com sinal trocado.
fn valor_a_debitar(tipo: TipoTransacao, valor: Decimal) -> Decimal {
    match tipo {
        TipoTransacao::Receita => -valor,
        TipoTransacao::Despesa => valor,
    }
}

/// Recalcula e grava o status do pai (já travado pela unidade de trabalho).
/// Estorno é terminal.
async fn reconciliar_transacao(
    uow: &mut dyn UnitOfWork,
    transacao: Transacao,
) -> Result<Transacao, AppError> {
    if transacao.status == StatusTransacao::Estornado {
        return Ok(transacao);
    }
    let parcelas = uow.listar_parcelas(transacao.id).await?;
    let novo_status = derivar_status(&parcelas);
    if novo_status == transacao.status {
        return Ok(transacao);
    }

    let atualizada = uow.atualizar_status_transacao(transacao.id, novo_status).await?;
    tracing::info!(
        transacao_id = %atualizada.id,
        de = ?transacao.status,
        para = ?novo_status,
        "🔄 Transação reconciliada"
    );
    Ok(atualizada)
}

#[derive(Clone)]
pub struct FinanceService {
    datastore: Arc<dyn Datastore>,
}

impl FinanceService {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self { datastore }
    }

    // --- Contas bancárias ---

    pub async fn criar_conta(
        &self,
        clinica_id: Uuid,
        payload: &CriarContaBancariaPayload,
    ) -> Result<ContaBancaria, AppError> {
        if !em_centavos(payload.saldo_inicial) {
            return Err(AppError::RegraNegocio(
                "Valores devem ter no máximo duas casas decimais.".into(),
            ));
        }
        let mut uow = self.datastore.begin().await?;
        let conta = uow
            .inserir_conta_bancaria(&NovaContaBancaria {
                clinica_id,
                nome: payload.nome.trim().to_string(),
                banco: payload.banco.clone(),
                saldo_inicial: payload.saldo_inicial,
            })
            .await?;
        uow.commit().await?;
        Ok(conta)
    }

    pub async fn listar_contas(&self, clinica_id: Uuid) -> Result<Vec<ContaBancaria>, AppError> {
        let mut uow = self.datastore.begin().await?;
        uow.listar_contas_bancarias(clinica_id).await
    }

    async fn conta_da_clinica(
        uow: &mut dyn UnitOfWork,
        clinica_id: Uuid,
        conta_id: Uuid,
    ) -> Result<ContaBancaria, AppError> {
        let conta = uow
            .buscar_conta_bancaria(clinica_id, conta_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Conta bancária {conta_id}")))?;
        if !conta.ativo {
            return Err(AppError::RegraNegocio("A conta bancária está inativa.".into()));
        }
        Ok(conta)
    }

    // --- Transações ---

    pub async fn criar_transacao(
        &self,
        clinica_id: Uuid,
        payload: &CriarTransacaoPayload,
    ) -> Result<TransacaoDetalhe, AppError> {
        if payload.valor_bruto <= Decimal::ZERO {
            return Err(AppError::RegraNegocio("O valor deve ser maior que zero.".into()));
        }
        if !em_centavos(payload.valor_bruto) || !em_centavos(payload.taxa) {
            return Err(AppError::RegraNegocio(
                "Valores devem ter no máximo duas casas decimais.".into(),
            ));
        }
        if payload.taxa.is_sign_negative() || payload.taxa >= payload.valor_bruto {
            return Err(AppError::RegraNegocio(
                "A taxa deve ser positiva e menor que o valor bruto.".into(),
            ));
        }
        let total = u32::try_from(payload.total_parcelas)
            .ok()
            .filter(|t| *t >= 1)
            .ok_or_else(|| AppError::RegraNegocio("Número de parcelas inválido.".into()))?;

        let valor_liquido = payload.valor_bruto - payload.taxa;
        let valores = dividir_em_parcelas(valor_liquido, total);

        // 1. Vínculos precisam ser da mesma clínica
        let mut uow = self.datastore.begin().await?;
        if let Some(paciente_id) = payload.paciente_id {
            uow.buscar_paciente(clinica_id, paciente_id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound(format!("Paciente {paciente_id}")))?;
        }
        if let Some(conta_id) = payload.conta_bancaria_id {
            Self::conta_da_clinica(&mut *uow, clinica_id, conta_id).await?;
        }

        // 2. Transação + parcelas mensais
        let transacao = uow
            .inserir_transacao(&NovaTransacao {
                clinica_id,
                tipo: payload.tipo,
                descricao: payload.descricao.trim().to_string(),
                valor_bruto: payload.valor_bruto,
                valor_liquido,
                total_parcelas: payload.total_parcelas,
                metodo_pagamento: payload.metodo_pagamento,
                paciente_id: payload.paciente_id,
                conta_bancaria_id: payload.conta_bancaria_id,
            })
            .await?;

        let mut parcelas = Vec::with_capacity(valores.len());
        for (i, valor) in valores.into_iter().enumerate() {
            let data_vencimento = payload
                .primeiro_vencimento
                .checked_add_months(Months::new(i as u32))
                .ok_or_else(|| AppError::RegraNegocio("Data de vencimento fora do intervalo.".into()))?;
            let parcela = uow
                .inserir_parcela(&NovaParcela {
                    transacao_id: transacao.id,
                    numero_parcela: i as i32 + 1,
                    valor,
                    data_vencimento,
                })
                .await?;
            parcelas.push(parcela);
        }
        uow.commit().await?;

        tracing::info!(
            transacao_id = %transacao.id,
            parcelas = parcelas.len(),
            "💰 Transação criada"
        );
        Ok(TransacaoDetalhe { transacao, parcelas })
    }

    pub async fn listar_transacoes(
        &self,
        clinica_id: Uuid,
        filtro: &FiltroTransacoes,
    ) -> Result<Vec<Transacao>, AppError> {
        let mut uow = self.datastore.begin().await?;
        uow.listar_transacoes(clinica_id, filtro).await
    }

    pub async fn detalhar_transacao(
        &self,
        clinica_id: Uuid,
        transacao_id: Uuid,
    ) -> Result<TransacaoDetalhe, AppError> {
        let mut uow = self.datastore.begin().await?;
        let transacao = uow
            .buscar_transacao(clinica_id, transacao_id, false)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Transação {transacao_id}")))?;
        let parcelas = uow.listar_parcelas(transacao.id).await?;
        Ok(TransacaoDetalhe { transacao, parcelas })
    }

    /// Recalcula o status sob demanda.
    pub async fn reconciliar(&self, clinica_id: Uuid, transacao_id: Uuid) -> Result<Transacao, AppError> {
        let mut uow = self.datastore.begin().await?;
        let transacao = uow
            .buscar_transacao(clinica_id, transacao_id, true)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Transação {transacao_id}")))?;
        let transacao = reconciliar_transacao(&mut *uow, transacao).await?;
        uow.commit().await?;
        Ok(transacao)
    }

    // --- Parcelas ---

    /// Parcela pendente + pai travado, na ordem pai -> filha.
    async fn parcela_pendente(
        uow: &mut dyn UnitOfWork,
        clinica_id: Uuid,
        parcela_id: Uuid,
    ) -> Result<(Parcela, Transacao), AppError> {
        let nao_encontrada = || AppError::ResourceNotFound(format!("Parcela {parcela_id}"));

        let transacao_id = uow
            .buscar_parcela(clinica_id, parcela_id)
            .await?
            .ok_or_else(nao_encontrada)?
            .transacao_id;
        let transacao = uow
            .buscar_transacao(clinica_id, transacao_id, true)
            .await?
            .ok_or_else(nao_encontrada)?;
        // Relida depois do lock
        let parcela = uow
            .buscar_parcela(clinica_id, parcela_id)
            .await?
            .ok_or_else(nao_encontrada)?;

        if transacao.status == StatusTransacao::Estornado {
            return Err(AppError::RegraNegocio("A transação foi estornada.".into()));
        }
        if parcela.status != StatusTransacao::Pendente {
            return Err(AppError::RegraNegocio(
                "Apenas parcelas pendentes podem ser alteradas.".into(),
            ));
        }
        Ok((parcela, transacao))
    }

    pub async fn pagar_parcela(
        &self,
        clinica_id: Uuid,
        parcela_id: Uuid,
        payload: &PagarParcelaPayload,
    ) -> Result<ParcelaAtualizada, AppError> {
        let mut uow = self.datastore.begin().await?;
        let (parcela, transacao) = Self::parcela_pendente(&mut *uow, clinica_id, parcela_id).await?;

        // 1. Conta de destino: a informada ou a da transação
        let conta_id = payload.conta_bancaria_id.or(transacao.conta_bancaria_id);
        if let Some(conta_id) = conta_id {
            Self::conta_da_clinica(&mut *uow, clinica_id, conta_id).await?;
        }

        // 2. Baixa da parcela
        let data_pagamento = payload.data_pagamento.unwrap_or_else(hoje);
        let parcela = uow
            .atualizar_parcela(parcela.id, StatusTransacao::Pago, Some(data_pagamento), conta_id)
            .await?;

        // 3. Movimento no saldo
        if let Some(conta_id) = conta_id {
            let saldo = uow
                .debitar_saldo(conta_id, valor_a_debitar(transacao.tipo, parcela.valor))
                .await?;
            tracing::debug!(conta_id = %conta_id, saldo = %saldo, "Saldo atualizado");
        }

        // 4. Pai reconciliado na mesma transação
        let transacao = reconciliar_transacao(&mut *uow, transacao).await?;
        uow.commit().await?;

        tracing::info!(parcela_id = %parcela.id, valor = %parcela.valor, "✅ Parcela paga");
        Ok(ParcelaAtualizada { parcela, transacao })
    }

    pub async fn cancelar_parcela(
        &self,
        clinica_id: Uuid,
        parcela_id: Uuid,
    ) -> Result<ParcelaAtualizada, AppError> {
        let mut uow = self.datastore.begin().await?;
        let (parcela, transacao) = Self::parcela_pendente(&mut *uow, clinica_id, parcela_id).await?;

        let parcela = uow
            .atualizar_parcela(parcela.id, StatusTransacao::Cancelado, None, None)
            .await?;
        let transacao = reconciliar_transacao(&mut *uow, transacao).await?;
        uow.commit().await?;

        tracing::info!(parcela_id = %parcela.id, "🚫 Parcela cancelada");
        Ok(ParcelaAtualizada { parcela, transacao })
    }

    /// Desfaz uma transação paga: devolve o efeito de cada parcela paga no
    /// saldo e marca tudo como estornado.
    pub async fn estornar(&self, clinica_id: Uuid, transacao_id: Uuid) -> Result<TransacaoDetalhe, AppError> {
        let mut uow = self.datastore.begin().await?;
        let transacao = uow
            .buscar_transacao(clinica_id, transacao_id, true)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Transação {transacao_id}")))?;

        if transacao.status != StatusTransacao::Pago {
            return Err(AppError::RegraNegocio(
                "Apenas transações pagas podem ser estornadas.".into(),
            ));
        }

        let mut parcelas = Vec::new();
        for parcela in uow.listar_parcelas(transacao.id).await? {
            if !parcela.esta_paga() {
                parcelas.push(parcela);
                continue;
            }
            if let Some(conta_id) = parcela.conta_bancaria_id {
                uow.debitar_saldo(conta_id, -valor_a_debitar(transacao.tipo, parcela.valor))
                    .await?;
            }
            let estornada = uow
                .atualizar_parcela(
                    parcela.id,
                    StatusTransacao::Estornado,
                    parcela.data_pagamento,
                    parcela.conta_bancaria_id,
                )
                .await?;
            parcelas.push(estornada);
        }

        let transacao = uow
            .atualizar_status_transacao(transacao.id, StatusTransacao::Estornado)
            .await?;
        uow.commit().await?;

        tracing::info!(transacao_id = %transacao.id, "↩️ Transação estornada");
        Ok(TransacaoDetalhe { transacao, parcelas })
    }
}

/// Data usada quando o pagamento não informa uma.
pub fn hoje() -> NaiveDate {
    Utc::now().date_naive()
}
